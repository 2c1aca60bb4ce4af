use anyhow::Context;
use clap::{Parser, Subcommand};
use hms_core::auth::{AuthGuard, Authority, Principal, StaticPrincipal};
use hms_core::config::page_size_from_env_value;
use hms_core::constants::{DEFAULT_API_BASE_URL, DEFAULT_APP_NAME, ROLE_ADMIN, ROLE_USER};
use hms_core::entities::{
    Appointment, Country, District, Entity, Patient, Persisted, State, ENTITY_NAMES,
};
use hms_core::resource::{Pageable, SortOrder};
use hms_core::router::{
    Activation, GoOptions, Navigator, Params, StateRegistry, StateResolver, Transition,
};
use hms_core::{Api, CoreConfig, NotificationChannel};
use hms_types::NonEmptyText;
use serde_json::Value;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "hms")]
#[command(about = "Hospital management admin CLI")]
struct Cli {
    /// Base URL of the REST backend (default: $HMS_API_URL or http://localhost:8080/)
    #[arg(long)]
    api_url: Option<String>,
    /// Authorities of the signed-in user
    #[arg(long = "role", default_values_t = [ROLE_ADMIN.to_string(), ROLE_USER.to_string()])]
    roles: Vec<String>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List an entity collection
    List {
        /// Entity name (appointment, patient, state, district, country)
        entity: String,
        /// Page number, starting at 0
        #[arg(long)]
        page: Option<u32>,
        /// Page size
        #[arg(long)]
        size: Option<u32>,
        /// Sort order, e.g. `state,desc` (repeatable)
        #[arg(long)]
        sort: Vec<String>,
    },
    /// Navigate to an admin URL, e.g. `/state/new` or `/patient/3`
    Open {
        url: String,
        /// Set a form field before saving, e.g. `state=Texas` or `country={"id":1}`
        #[arg(long = "set", value_name = "FIELD=VALUE")]
        assignments: Vec<String>,
        /// Save the dialog (or confirm the delete) instead of cancelling it
        #[arg(long)]
        confirm: bool,
    },
}

/// Everything a command needs to talk to the backend.
struct Session {
    cfg: Arc<CoreConfig>,
    api: Api,
    channel: NotificationChannel,
    navigator: Navigator,
}

impl Session {
    fn new(api_url: Option<String>, roles: &[String]) -> anyhow::Result<Self> {
        let api_url = api_url
            .or_else(|| std::env::var("HMS_API_URL").ok())
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.into());
        let app_name = std::env::var("HMS_APP_NAME").unwrap_or_else(|_| DEFAULT_APP_NAME.into());
        let page_size = page_size_from_env_value(std::env::var("HMS_PAGE_SIZE").ok())?;

        let cfg = Arc::new(CoreConfig::new(
            &api_url,
            NonEmptyText::new(app_name)?,
            page_size,
        )?);

        let authorities = roles
            .iter()
            .map(Authority::new)
            .collect::<Result<Vec<_>, _>>()?;
        tracing::debug!("using REST backend at {}", cfg.api_base_url());
        let principal = Principal::new("cli", authorities);
        let navigator = Navigator::new(
            Arc::new(StateRegistry::for_application(&cfg)?),
            AuthGuard::new(Arc::new(StaticPrincipal::signed_in(principal))),
        );

        Ok(Self {
            api: Api::http(cfg.clone())?,
            channel: NotificationChannel::new(&cfg),
            cfg,
            navigator,
        })
    }

    fn resolver<E: Entity>(&self) -> StateResolver<E> {
        StateResolver::new(self.api.clone(), self.channel.clone())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("hms_core=warn".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::List {
            entity,
            page,
            size,
            sort,
        }) => {
            let mut session = Session::new(cli.api_url, &cli.roles)?;
            let pageable = pageable(&session.cfg, page, size, &sort)?;
            match entity.as_str() {
                Appointment::NAME => list::<Appointment>(&mut session, pageable).await?,
                Patient::NAME => list::<Patient>(&mut session, pageable).await?,
                State::NAME => list::<State>(&mut session, pageable).await?,
                District::NAME => list::<District>(&mut session, pageable).await?,
                Country::NAME => list::<Country>(&mut session, pageable).await?,
                other => anyhow::bail!(
                    "unknown entity: {} (expected one of {})",
                    other,
                    ENTITY_NAMES.join(", ")
                ),
            }
        }
        Some(Commands::Open {
            url,
            assignments,
            confirm,
        }) => {
            let mut session = Session::new(cli.api_url, &cli.roles)?;
            let transition = session.navigator.go_url(&url, GoOptions::default())?;
            let entity = transition
                .state
                .entity
                .with_context(|| format!("{} is not an entity view", url))?;
            match entity {
                Appointment::NAME => {
                    open::<Appointment>(&mut session, transition, &assignments, confirm).await?
                }
                Patient::NAME => {
                    open::<Patient>(&mut session, transition, &assignments, confirm).await?
                }
                State::NAME => open::<State>(&mut session, transition, &assignments, confirm).await?,
                District::NAME => {
                    open::<District>(&mut session, transition, &assignments, confirm).await?
                }
                Country::NAME => {
                    open::<Country>(&mut session, transition, &assignments, confirm).await?
                }
                other => anyhow::bail!(
                    "unknown entity: {} (expected one of {})",
                    other,
                    ENTITY_NAMES.join(", ")
                ),
            }
        }
        None => {
            println!("Use 'hms --help' for commands");
        }
    }

    Ok(())
}

fn pageable(
    cfg: &CoreConfig,
    page: Option<u32>,
    size: Option<u32>,
    sort: &[String],
) -> anyhow::Result<Pageable> {
    let mut pageable = Pageable::first(size.unwrap_or(cfg.page_size()));
    pageable.page = page.unwrap_or(0);
    if !sort.is_empty() {
        pageable.sort = sort
            .iter()
            .map(|s| s.parse::<SortOrder>())
            .collect::<Result<_, _>>()?;
    }
    Ok(pageable)
}

async fn list<E: Entity>(session: &mut Session, pageable: Pageable) -> anyhow::Result<()> {
    // Entering the list state checks the user's authorities.
    let transition = session
        .navigator
        .go(E::NAME, Params::new(), GoOptions::default())?;
    let list = hms_core::controllers::ListController::load(
        session.api.resource::<E>(),
        pageable,
    )
    .await?;
    session.navigator.commit(&transition);

    print_rows(list.items())?;
    println!(
        "page {} of {} {} ({} total)",
        list.pageable().page,
        list.links().get("last").map_or(0, |last| last + 1),
        E::COLLECTION,
        list.total_count().unwrap_or(list.items().len() as u64),
    );
    Ok(())
}

async fn open<E: Entity>(
    session: &mut Session,
    transition: Transition,
    assignments: &[String],
    confirm: bool,
) -> anyhow::Result<()> {
    let resolver = session.resolver::<E>();

    let activation = resolver.activate(&transition).await?;
    session.navigator.commit(&transition);

    let outcome = match activation {
        Activation::Dialog {
            mut controller,
            pending,
        } => {
            apply_assignments(controller.draft_mut(), assignments)?;
            if confirm {
                let saved = controller.save().await?;
                println!("Saved {} {}", E::NAME, saved.id);
            } else {
                controller.clear();
            }
            pending.result().await.outcome()
        }
        Activation::Delete {
            mut controller,
            pending,
        } => {
            print_entity(controller.entity())?;
            if confirm {
                controller.confirm_delete().await?;
                println!("Deleted {} {}", E::NAME, controller.entity().id);
            } else {
                controller.clear();
            }
            pending.result().await.outcome()
        }
        view => return render(view),
    };

    let next = session.navigator.exit_modal(&transition, outcome)?;
    if next.retained {
        session.navigator.commit(&next);
        println!("Back to {}", next.url);
        return Ok(());
    }
    println!("-> {}", next.url);
    let view = resolver.activate(&next).await?;
    session.navigator.commit(&next);
    render(view)
}

fn render<E: Entity>(activation: Activation<E>) -> anyhow::Result<()> {
    match activation {
        Activation::List(list) => print_rows(list.items()),
        Activation::Detail(detail) => {
            print_entity(&detail.entity())?;
            println!("Back: {}", detail.previous_state().url);
            Ok(())
        }
        Activation::Dialog { .. } | Activation::Delete { .. } => {
            anyhow::bail!("expected a view, got a dialog")
        }
    }
}

fn print_rows<E: Entity>(rows: &[Persisted<E>]) -> anyhow::Result<()> {
    if rows.is_empty() {
        println!("No {} found.", E::COLLECTION);
    }
    for row in rows {
        println!("{}", serde_json::to_string(row)?);
    }
    Ok(())
}

fn print_entity<E: Entity>(entity: &Persisted<E>) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(entity)?);
    Ok(())
}

/// Apply `field=value` assignments to a form.
///
/// Values starting with `{` or `[`, and `null`, are read as JSON; everything else is a
/// string.
fn apply_assignments<E: Entity>(draft: &mut E, assignments: &[String]) -> anyhow::Result<()> {
    if assignments.is_empty() {
        return Ok(());
    }

    let mut value = serde_json::to_value(&*draft)?;
    let fields = value
        .as_object_mut()
        .with_context(|| format!("{} is not a form", E::NAME))?;

    for assignment in assignments {
        let (field, raw) = assignment
            .split_once('=')
            .with_context(|| format!("expected FIELD=VALUE, got {}", assignment))?;
        if !fields.contains_key(field) {
            anyhow::bail!("{} has no field {}", E::NAME, field);
        }
        let raw = raw.trim();
        let parsed = if raw.starts_with('{') || raw.starts_with('[') || raw == "null" {
            serde_json::from_str(raw).with_context(|| format!("invalid JSON for {}", field))?
        } else {
            Value::String(raw.to_string())
        };
        fields.insert(field.to_string(), parsed);
    }

    *draft = serde_json::from_value(value).with_context(|| format!("invalid {}", E::NAME))?;
    Ok(())
}
