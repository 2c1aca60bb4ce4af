use super::url::{Params, UrlPattern};
use crate::auth::Authority;
use crate::config::CoreConfig;
use crate::constants::ENTITY_ROOT_STATE;
use crate::entities::{Appointment, Country, District, Entity, Patient, State};
use crate::{AdminError, AdminResult};
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StateKind {
    /// Groups child states; cannot be entered.
    Abstract,
    List,
    Detail,
    /// Create/edit form opened as a modal over the parent view.
    Dialog,
    /// Delete confirmation opened as a modal over the parent view.
    Delete,
}

impl StateKind {
    pub fn is_modal(self) -> bool {
        matches!(self, StateKind::Dialog | StateKind::Delete)
    }
}

/// Data a state needs before its controller is built.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resolve {
    Nothing,
    Collection,
    /// Fetch the entity named by the `id` parameter.
    EntityById,
    /// A blank draft; no network read.
    Blank,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TargetState {
    /// The parent of the modal state (`^`).
    Parent,
    Named(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExitTarget {
    pub state: TargetState,
    pub reload: bool,
}

/// Where a modal state navigates once its modal resolves.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModalExit {
    pub on_confirm: ExitTarget,
    pub on_cancel: ExitTarget,
}

/// One navigable state.
///
/// `url` is relative to the parent until the state is registered, and the full pattern
/// afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StateDef {
    pub name: String,
    pub parent: Option<String>,
    pub url: UrlPattern,
    pub authorities: Vec<Authority>,
    pub entity: Option<&'static str>,
    pub kind: StateKind,
    pub resolve: Resolve,
    pub exit: Option<ModalExit>,
    pub page_title: Option<String>,
}

impl StateDef {
    pub fn new(name: impl Into<String>, kind: StateKind) -> Self {
        Self {
            name: name.into(),
            parent: None,
            url: UrlPattern::default(),
            authorities: Vec::new(),
            entity: None,
            kind,
            resolve: Resolve::Nothing,
            exit: None,
            page_title: None,
        }
    }

    pub fn parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn url(mut self, url: &str) -> Self {
        self.url = UrlPattern::parse(url);
        self
    }

    pub fn authorities(mut self, authorities: impl IntoIterator<Item = Authority>) -> Self {
        self.authorities = authorities.into_iter().collect();
        self
    }

    pub fn entity(mut self, entity: &'static str) -> Self {
        self.entity = Some(entity);
        self
    }

    pub fn resolve(mut self, resolve: Resolve) -> Self {
        self.resolve = resolve;
        self
    }

    pub fn exit(mut self, on_confirm: ExitTarget, on_cancel: ExitTarget) -> Self {
        self.exit = Some(ModalExit {
            on_confirm,
            on_cancel,
        });
        self
    }

    pub fn page_title(mut self, title: impl Into<String>) -> Self {
        self.page_title = Some(title.into());
        self
    }
}

fn go_to(state: &str, reload: bool) -> ExitTarget {
    ExitTarget {
        state: TargetState::Named(state.to_string()),
        reload,
    }
}

fn go_up(reload: bool) -> ExitTarget {
    ExitTarget {
        state: TargetState::Parent,
        reload,
    }
}

/// The six states of an entity: list, detail, and the four modal states.
pub fn entity_states<E: Entity>(app_name: &str) -> AdminResult<Vec<StateDef>> {
    let name = E::NAME;
    let list = name.to_string();
    let detail = format!("{name}-detail");
    let authorities = E::AUTHORITIES
        .iter()
        .map(Authority::new)
        .collect::<AdminResult<Vec<_>>>()?;

    let state = |state_name: String, kind: StateKind| {
        StateDef::new(state_name, kind)
            .entity(name)
            .authorities(authorities.clone())
    };

    Ok(vec![
        state(list.clone(), StateKind::List)
            .parent(ENTITY_ROOT_STATE)
            .url(&format!("/{name}"))
            .resolve(Resolve::Collection)
            .page_title(format!("{app_name}.{name}.home.title")),
        state(detail.clone(), StateKind::Detail)
            .parent(ENTITY_ROOT_STATE)
            .url(&format!("/{name}/{{id}}"))
            .resolve(Resolve::EntityById)
            .page_title(format!("{app_name}.{name}.detail.title")),
        state(format!("{detail}.edit"), StateKind::Dialog)
            .parent(detail.clone())
            .url("/detail/edit")
            .resolve(Resolve::EntityById)
            .exit(go_up(false), go_up(false)),
        state(format!("{list}.new"), StateKind::Dialog)
            .parent(list.clone())
            .url("/new")
            .resolve(Resolve::Blank)
            .exit(go_to(&list, true), go_to(&list, false)),
        state(format!("{list}.edit"), StateKind::Dialog)
            .parent(list.clone())
            .url("/{id}/edit")
            .resolve(Resolve::EntityById)
            .exit(go_to(&list, true), go_up(false)),
        state(format!("{list}.delete"), StateKind::Delete)
            .parent(list.clone())
            .url("/{id}/delete")
            .resolve(Resolve::EntityById)
            .exit(go_to(&list, true), go_up(false)),
    ])
}

/// Declarative table of every navigable state.
#[derive(Clone, Debug)]
pub struct StateRegistry {
    states: BTreeMap<String, Arc<StateDef>>,
}

impl Default for StateRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl StateRegistry {
    /// A registry holding only the abstract `entity` root.
    pub fn new() -> Self {
        let root = StateDef::new(ENTITY_ROOT_STATE, StateKind::Abstract);
        let mut states = BTreeMap::new();
        states.insert(root.name.clone(), Arc::new(root));
        Self { states }
    }

    /// A registry with the states of every hospital management entity.
    pub fn for_application(cfg: &CoreConfig) -> AdminResult<Self> {
        let mut registry = Self::new();
        registry.register_entity::<Appointment>(cfg)?;
        registry.register_entity::<Patient>(cfg)?;
        registry.register_entity::<State>(cfg)?;
        registry.register_entity::<District>(cfg)?;
        registry.register_entity::<Country>(cfg)?;
        Ok(registry)
    }

    pub fn register_entity<E: Entity>(&mut self, cfg: &CoreConfig) -> AdminResult<()> {
        for state in entity_states::<E>(cfg.app_name())? {
            self.register(state)?;
        }
        Ok(())
    }

    /// Register a state. Its parent must already be registered.
    pub fn register(&mut self, mut state: StateDef) -> AdminResult<()> {
        if self.states.contains_key(&state.name) {
            return Err(AdminError::DuplicateState(state.name));
        }
        if let Some(parent) = &state.parent {
            let parent = self.get(parent)?;
            state.url = parent.url.join(&state.url);
        }
        self.states.insert(state.name.clone(), Arc::new(state));
        Ok(())
    }

    pub fn get(&self, name: &str) -> AdminResult<Arc<StateDef>> {
        self.states
            .get(name)
            .cloned()
            .ok_or_else(|| AdminError::UnknownState(name.to_string()))
    }

    pub fn states(&self) -> impl Iterator<Item = &Arc<StateDef>> {
        self.states.values()
    }

    /// Find the state a URL points at.
    ///
    /// When several patterns match, the one with the most literal segments wins, so
    /// `/state/new` is the "new" dialog rather than the detail of an entity called `new`.
    pub fn match_url(&self, url: &str) -> AdminResult<(Arc<StateDef>, Params)> {
        self.states
            .values()
            .filter(|s| s.kind != StateKind::Abstract)
            .filter_map(|s| s.url.matches(url).map(|params| (s, params)))
            .max_by_key(|(s, _)| s.url.literal_count())
            .map(|(s, params)| (Arc::clone(s), params))
            .ok_or_else(|| AdminError::NoMatchingUrl(url.to_string()))
    }

    pub fn href(&self, name: &str, params: &Params) -> AdminResult<String> {
        self.get(name)?.url.format(params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::ROLE_ADMIN;
    use crate::testing::test_config;

    fn registry() -> StateRegistry {
        StateRegistry::for_application(&test_config()).unwrap()
    }

    #[test]
    fn test_entity_states_have_full_urls() {
        let registry = registry();
        let urls: Vec<(String, String)> = [
            "state",
            "state-detail",
            "state-detail.edit",
            "state.new",
            "state.edit",
            "state.delete",
        ]
        .iter()
        .map(|name| {
            let state = registry.get(name).unwrap();
            (state.name.clone(), state.url.to_string())
        })
        .collect();

        assert_eq!(
            urls,
            vec![
                ("state".into(), "/state".into()),
                ("state-detail".into(), "/state/{id}".into()),
                ("state-detail.edit".into(), "/state/{id}/detail/edit".into()),
                ("state.new".into(), "/state/new".into()),
                ("state.edit".into(), "/state/{id}/edit".into()),
                ("state.delete".into(), "/state/{id}/delete".into()),
            ]
        );
    }

    #[test]
    fn test_states_carry_entity_authorities() {
        let state = registry().get("state.delete").unwrap();
        assert_eq!(state.authorities, vec![Authority::new(ROLE_ADMIN).unwrap()]);
        assert_eq!(state.entity, Some("state"));
        assert_eq!(state.kind, StateKind::Delete);
        assert_eq!(
            registry().get("state").unwrap().page_title.as_deref(),
            Some("hospitalManagementApp.state.home.title")
        );
    }

    #[test]
    fn test_match_url_prefers_literal_segments() {
        let registry = registry();

        let (state, params) = registry.match_url("/state/new").unwrap();
        assert_eq!(state.name, "state.new");
        assert!(params.is_empty());

        let (state, params) = registry.match_url("/state/42").unwrap();
        assert_eq!(state.name, "state-detail");
        assert_eq!(params.get("id").map(String::as_str), Some("42"));

        let (state, _) = registry.match_url("/patient/3/detail/edit").unwrap();
        assert_eq!(state.name, "patient-detail.edit");

        assert!(matches!(
            registry.match_url("/nowhere"),
            Err(AdminError::NoMatchingUrl(_))
        ));
    }

    #[test]
    fn test_register_rejects_duplicates_and_orphans() {
        let mut registry = registry();
        let err = registry
            .register(StateDef::new("state", StateKind::List).parent(ENTITY_ROOT_STATE))
            .unwrap_err();
        assert!(matches!(err, AdminError::DuplicateState(_)));

        let err = registry
            .register(StateDef::new("ward", StateKind::List).parent("hospital"))
            .unwrap_err();
        assert!(matches!(err, AdminError::UnknownState(name) if name == "hospital"));
    }

    #[test]
    fn test_modal_exit_table() {
        let registry = registry();

        let new = registry.get("state.new").unwrap();
        let exit = new.exit.as_ref().unwrap();
        assert_eq!(exit.on_confirm, go_to("state", true));
        assert_eq!(exit.on_cancel, go_to("state", false));

        let edit = registry.get("state.edit").unwrap();
        assert_eq!(edit.exit.as_ref().unwrap().on_cancel, go_up(false));

        let detail_edit = registry.get("state-detail.edit").unwrap();
        assert_eq!(detail_edit.exit.as_ref().unwrap().on_confirm, go_up(false));
        assert_eq!(detail_edit.parent.as_deref(), Some("state-detail"));

        assert!(registry.get("state").unwrap().exit.is_none());
    }
}
