//! # API REST
//!
//! Development REST backend for the hospital management admin.
//!
//! Handles:
//! - CRUD endpoints under `/api/{entities}` for every entity, with axum
//! - Alert headers (`X-{app}-alert`, `X-{app}-error`, `X-{app}-params`)
//! - Paging (`page`, `size`, `sort`) with `X-Total-Count` and `Link` headers
//! - REST-specific concerns (JSON serialization, CORS, request tracing)
//!
//! Rows are kept in memory; restarting the server starts from empty collections.

#![warn(rust_2018_idioms)]

mod store;

pub use store::EntityStore;

use axum::{
    extract::{Path, Query, State},
    http::{header::LOCATION, HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use hms_core::config::{alert_header, error_header, params_header};
use hms_core::constants::{API_PREFIX, DEFAULT_PAGE_SIZE, TOTAL_COUNT_HEADER};
use hms_core::entities::{
    Appointment, Country, District, Entity, EntityId, Patient, Persisted, Record,
    State as StateEntity,
};
use hms_core::resource::{pagination_link_header, Pageable};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

#[derive(Debug, Default)]
struct Stores {
    appointments: EntityStore<Appointment>,
    patients: EntityStore<Patient>,
    states: EntityStore<StateEntity>,
    districts: EntityStore<District>,
    countries: EntityStore<Country>,
}

/// Application state for the REST API server
///
/// Holds one in-memory store per entity and the application name used in alert headers.
#[derive(Clone, Debug)]
pub struct AppState {
    app_name: Arc<str>,
    stores: Arc<Stores>,
}

impl AppState {
    pub fn new(app_name: &str) -> Self {
        Self {
            app_name: Arc::from(app_name),
            stores: Arc::default(),
        }
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    pub fn store<E: Entity>(&self) -> &EntityStore<E>
    where
        Self: HasStore<E>,
    {
        <Self as HasStore<E>>::entity_store(self)
    }

    fn alert(&self, entity: &str, action: &str, id: EntityId) -> HeaderMap {
        let mut headers = HeaderMap::new();
        push_header(
            &mut headers,
            &alert_header(&self.app_name),
            &format!("{}.{}.{}", self.app_name, entity, action),
        );
        push_header(
            &mut headers,
            &params_header(&self.app_name),
            &id.to_string(),
        );
        headers
    }

    fn error(
        &self,
        status: StatusCode,
        entity: &'static str,
        key: &'static str,
        message: String,
    ) -> ApiError {
        ApiError {
            status,
            app_name: Arc::clone(&self.app_name),
            entity,
            key,
            message,
        }
    }
}

/// Access to the store of one entity type.
pub trait HasStore<E: Entity> {
    fn entity_store(&self) -> &EntityStore<E>;
}

impl HasStore<Appointment> for AppState {
    fn entity_store(&self) -> &EntityStore<Appointment> {
        &self.stores.appointments
    }
}

impl HasStore<Patient> for AppState {
    fn entity_store(&self) -> &EntityStore<Patient> {
        &self.stores.patients
    }
}

impl HasStore<StateEntity> for AppState {
    fn entity_store(&self) -> &EntityStore<StateEntity> {
        &self.stores.states
    }
}

impl HasStore<District> for AppState {
    fn entity_store(&self) -> &EntityStore<District> {
        &self.stores.districts
    }
}

impl HasStore<Country> for AppState {
    fn entity_store(&self) -> &EntityStore<Country> {
        &self.stores.countries
    }
}

/// A failed request, reported through the `X-{app}-error` header.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    app_name: Arc<str>,
    entity: &'static str,
    key: &'static str,
    message: String,
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
    description: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let key = format!("error.{}", self.key);
        let mut headers = HeaderMap::new();
        push_header(&mut headers, &error_header(&self.app_name), &key);
        push_header(&mut headers, &params_header(&self.app_name), self.entity);

        let body = ErrorBody {
            message: key,
            description: self.message,
        };
        (self.status, headers, Json(body)).into_response()
    }
}

fn push_header(headers: &mut HeaderMap, name: &str, value: &str) {
    match (
        HeaderName::from_bytes(name.as_bytes()),
        HeaderValue::from_str(value),
    ) {
        (Ok(name), Ok(value)) => {
            headers.insert(name, value);
        }
        _ => tracing::warn!("skipping invalid header {}: {}", name, value),
    }
}

#[derive(Serialize)]
struct Health {
    ok: bool,
    message: String,
}

/// Health check endpoint for the REST API
#[axum::debug_handler]
async fn health(State(state): State<AppState>) -> Json<Health> {
    Json(Health {
        ok: true,
        message: format!("{} REST API is alive", state.app_name()),
    })
}

/// List an entity collection.
///
/// With `page` or `size` the response is one page, sorted by the `sort` parameters, and
/// carries a `Link` header. `X-Total-Count` is always the size of the whole collection.
async fn list<E: Entity>(
    State(state): State<AppState>,
    Query(query): Query<Vec<(String, String)>>,
) -> Result<Response, ApiError>
where
    AppState: HasStore<E>,
{
    tracing::debug!("REST request to get a page of {}", E::COLLECTION);

    let pageable = Pageable::from_query(&query, DEFAULT_PAGE_SIZE).map_err(|e| {
        state.error(StatusCode::BAD_REQUEST, E::NAME, "badrequest", e.to_string())
    })?;
    let (rows, total) = state.store::<E>().list(pageable.as_ref());

    let mut headers = HeaderMap::new();
    push_header(&mut headers, TOTAL_COUNT_HEADER, &total.to_string());
    if let Some(pageable) = &pageable {
        let base = format!("/{}/{}", API_PREFIX, E::COLLECTION);
        let link = pagination_link_header(&base, pageable.page, pageable.size, total);
        push_header(&mut headers, "link", &link);
    }
    Ok((StatusCode::OK, headers, Json(rows)).into_response())
}

async fn fetch<E: Entity>(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
) -> Result<Json<Persisted<E>>, ApiError>
where
    AppState: HasStore<E>,
{
    tracing::debug!("REST request to get {} : {}", E::NAME, id);

    state.store::<E>().get(id).map(Json).ok_or_else(|| {
        state.error(
            StatusCode::NOT_FOUND,
            E::NAME,
            "notfound",
            format!("{} {} not found", E::NAME, id),
        )
    })
}

/// Create an entity. A body that already carries an id is rejected.
async fn create<E: Entity>(
    State(state): State<AppState>,
    Json(record): Json<Record<E>>,
) -> Result<Response, ApiError>
where
    AppState: HasStore<E>,
{
    tracing::debug!("REST request to save {} : {:?}", E::NAME, record);

    match record {
        Record::Draft(fields) => Ok(created(&state, fields)),
        Record::Persisted(_) => Err(state.error(
            StatusCode::BAD_REQUEST,
            E::NAME,
            "idexists",
            format!("a new {} cannot already have an id", E::NAME),
        )),
    }
}

fn created<E: Entity>(state: &AppState, fields: E) -> Response
where
    AppState: HasStore<E>,
{
    let saved = state.store::<E>().insert(fields);
    let mut headers = state.alert(E::NAME, "created", saved.id);
    push_header(
        &mut headers,
        LOCATION.as_str(),
        &format!("/{}/{}/{}", API_PREFIX, E::COLLECTION, saved.id),
    );
    (StatusCode::CREATED, headers, Json(saved)).into_response()
}

/// Update the entity at `/{entities}/{id}`. A body id, when present, must match the path.
async fn update<E: Entity>(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
    Json(record): Json<Record<E>>,
) -> Result<Response, ApiError>
where
    AppState: HasStore<E>,
{
    tracing::debug!("REST request to update {} : {:?}", E::NAME, record);

    let entity = match record {
        Record::Draft(fields) => Persisted::new(id, fields),
        Record::Persisted(entity) if entity.id == id => entity,
        Record::Persisted(entity) => {
            return Err(state.error(
                StatusCode::BAD_REQUEST,
                E::NAME,
                "idmismatch",
                format!("body id {} does not match path id {}", entity.id, id),
            ))
        }
    };
    replaced(&state, entity)
}

/// Update the entity identified by the body; a body without id is created instead.
async fn update_from_body<E: Entity>(
    State(state): State<AppState>,
    Json(record): Json<Record<E>>,
) -> Result<Response, ApiError>
where
    AppState: HasStore<E>,
{
    tracing::debug!("REST request to update {} : {:?}", E::NAME, record);

    match record {
        Record::Draft(fields) => Ok(created(&state, fields)),
        Record::Persisted(entity) => replaced(&state, entity),
    }
}

fn replaced<E: Entity>(state: &AppState, entity: Persisted<E>) -> Result<Response, ApiError>
where
    AppState: HasStore<E>,
{
    let id = entity.id;
    match state.store::<E>().replace(entity) {
        Some(saved) => {
            let headers = state.alert(E::NAME, "updated", id);
            Ok((StatusCode::OK, headers, Json(saved)).into_response())
        }
        None => Err(state.error(
            StatusCode::NOT_FOUND,
            E::NAME,
            "notfound",
            format!("{} {} not found", E::NAME, id),
        )),
    }
}

async fn remove<E: Entity>(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
) -> Result<Response, ApiError>
where
    AppState: HasStore<E>,
{
    tracing::debug!("REST request to delete {} : {}", E::NAME, id);

    if !state.store::<E>().remove(id) {
        return Err(state.error(
            StatusCode::NOT_FOUND,
            E::NAME,
            "notfound",
            format!("{} {} not found", E::NAME, id),
        ));
    }
    Ok((StatusCode::OK, state.alert(E::NAME, "deleted", id)).into_response())
}

fn entity_routes<E: Entity>(router: Router<AppState>) -> Router<AppState>
where
    AppState: HasStore<E>,
{
    let collection = format!("/{}/{}", API_PREFIX, E::COLLECTION);
    let item = format!("{collection}/:id");
    router
        .route(
            &collection,
            get(list::<E>).post(create::<E>).put(update_from_body::<E>),
        )
        .route(
            &item,
            get(fetch::<E>).put(update::<E>).delete(remove::<E>),
        )
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    let app = Router::new().route("/health", get(health));
    let app = entity_routes::<Appointment>(app);
    let app = entity_routes::<Patient>(app);
    let app = entity_routes::<StateEntity>(app);
    let app = entity_routes::<District>(app);
    let app = entity_routes::<Country>(app);

    app.layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serve the REST API on `listener` until the server fails.
pub async fn serve(listener: tokio::net::TcpListener, state: AppState) -> anyhow::Result<()> {
    let addr = listener.local_addr()?;
    tracing::info!("-- Serving {} REST API on {}", state.app_name(), addr);
    axum::serve(listener, router(state)).await?;
    Ok(())
}
