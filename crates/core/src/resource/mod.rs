//! Typed REST resource clients.
//!
//! [`Api`] bundles a [`Transport`] with the [`CoreConfig`] and hands out one
//! [`ResourceClient`] per entity type. Each client maps the five CRUD operations onto
//! the entity's collection:
//!
//! | operation | request |
//! |---|---|
//! | `query` | `GET api/{entities}` |
//! | `get` | `GET api/{entities}/{id}` |
//! | `create` | `POST api/{entities}` |
//! | `update` | `PUT api/{entities}/{id}` |
//! | `delete` | `DELETE api/{entities}/{id}` |
//!
//! Reads are lenient: an empty or undecodable body is logged and becomes an empty
//! result. Writes must return the stored entity.

mod http;
mod pagination;
mod transport;

pub use http::HttpTransport;
pub use pagination::{
    pagination_link_header, parse_links, Direction, Links, Page, Pageable, SortOrder,
};
pub use transport::{ApiRequest, ApiResponse, Method, Transport};

use crate::config::CoreConfig;
use crate::constants::{API_PREFIX, LINK_HEADER, TOTAL_COUNT_HEADER};
use crate::entities::{Entity, EntityId, Persisted, Record};
use crate::{AdminError, AdminResult};
use std::marker::PhantomData;
use std::sync::Arc;

/// Shared handle to the backend.
#[derive(Clone)]
pub struct Api {
    transport: Arc<dyn Transport>,
    cfg: Arc<CoreConfig>,
}

impl Api {
    pub fn new(transport: Arc<dyn Transport>, cfg: Arc<CoreConfig>) -> Self {
        Self { transport, cfg }
    }

    /// An `Api` talking HTTP to the configured base URL.
    pub fn http(cfg: Arc<CoreConfig>) -> AdminResult<Self> {
        let transport = HttpTransport::new(&cfg)?;
        Ok(Self::new(Arc::new(transport), cfg))
    }

    pub fn config(&self) -> &CoreConfig {
        &self.cfg
    }

    pub fn resource<E: Entity>(&self) -> ResourceClient<E> {
        ResourceClient {
            api: self.clone(),
            _entity: PhantomData,
        }
    }
}

impl std::fmt::Debug for Api {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Api")
            .field("api_base_url", &self.cfg.api_base_url().as_str())
            .finish_non_exhaustive()
    }
}

/// CRUD accessor for one entity type.
pub struct ResourceClient<E> {
    api: Api,
    _entity: PhantomData<fn() -> E>,
}

impl<E> Clone for ResourceClient<E> {
    fn clone(&self) -> Self {
        Self {
            api: self.api.clone(),
            _entity: PhantomData,
        }
    }
}

impl<E> std::fmt::Debug for ResourceClient<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceClient")
            .field("api", &self.api)
            .finish()
    }
}

impl<E: Entity> ResourceClient<E> {
    pub fn collection_path() -> String {
        format!("{}/{}", API_PREFIX, E::COLLECTION)
    }

    pub fn item_path(id: EntityId) -> String {
        format!("{}/{}/{}", API_PREFIX, E::COLLECTION, id)
    }

    /// List the collection, optionally one page of it.
    pub async fn query(&self, pageable: Option<&Pageable>) -> AdminResult<Page<E>> {
        tracing::debug!("REST request to get a page of {}", E::COLLECTION);

        let mut request = ApiRequest::new(Method::Get, Self::collection_path());
        if let Some(pageable) = pageable {
            request = request.with_query(pageable.to_query());
        }
        let response = self.execute(request).await?;

        let items = if response.has_body() {
            serde_json::from_str::<Vec<Persisted<E>>>(&response.body).unwrap_or_else(|e| {
                tracing::warn!("ignoring undecodable {} list: {}", E::NAME, e);
                Vec::new()
            })
        } else {
            Vec::new()
        };

        let total_count = response
            .header(TOTAL_COUNT_HEADER)
            .and_then(|v| v.trim().parse::<u64>().ok());
        let links = match response.header(LINK_HEADER) {
            Some(header) => parse_links(header).unwrap_or_else(|e| {
                tracing::warn!("{}", e);
                Links::new()
            }),
            None => Links::new(),
        };

        Ok(Page {
            items,
            total_count,
            links,
        })
    }

    /// Fetch one entity. An empty or undecodable body yields `None`.
    pub async fn get(&self, id: EntityId) -> AdminResult<Option<Persisted<E>>> {
        tracing::debug!("REST request to get {} : {}", E::NAME, id);

        let response = self
            .execute(ApiRequest::new(Method::Get, Self::item_path(id)))
            .await?;
        if !response.has_body() {
            return Ok(None);
        }

        match serde_json::from_str::<Persisted<E>>(&response.body) {
            Ok(entity) => Ok(Some(entity)),
            Err(e) => {
                tracing::warn!("ignoring undecodable {} {}: {}", E::NAME, id, e);
                Ok(None)
            }
        }
    }

    pub async fn create(&self, fields: &E) -> AdminResult<Persisted<E>> {
        tracing::debug!("REST request to save {} : {:?}", E::NAME, fields);

        let body = serde_json::to_value(Record::Draft(fields.clone()))
            .map_err(AdminError::Serialization)?;
        let request = ApiRequest::new(Method::Post, Self::collection_path()).with_body(body);
        self.write(request).await
    }

    pub async fn update(&self, entity: &Persisted<E>) -> AdminResult<Persisted<E>> {
        tracing::debug!("REST request to update {} : {:?}", E::NAME, entity);

        let body = serde_json::to_value(entity).map_err(AdminError::Serialization)?;
        let request = ApiRequest::new(Method::Put, Self::item_path(entity.id)).with_body(body);
        self.write(request).await
    }

    /// Create a draft or update a persisted record.
    pub async fn save(&self, record: &Record<E>) -> AdminResult<Persisted<E>> {
        match record {
            Record::Draft(fields) => self.create(fields).await,
            Record::Persisted(entity) => self.update(entity).await,
        }
    }

    pub async fn delete(&self, id: EntityId) -> AdminResult<()> {
        tracing::debug!("REST request to delete {} : {}", E::NAME, id);

        self.execute(ApiRequest::new(Method::Delete, Self::item_path(id)))
            .await?;
        Ok(())
    }

    async fn write(&self, request: ApiRequest) -> AdminResult<Persisted<E>> {
        let method = request.method;
        let path = request.path.clone();
        let response = self.execute(request).await?;

        if !response.has_body() {
            return Err(AdminError::EmptyResponse { method, path });
        }
        serde_json::from_str(&response.body).map_err(AdminError::Deserialization)
    }

    async fn execute(&self, request: ApiRequest) -> AdminResult<ApiResponse> {
        let method = request.method;
        let path = request.path.clone();
        let cfg = self.api.config();

        let response = self.api.transport.send(request).await?;

        if !response.is_success() {
            let error_key = response.header(&cfg.error_header()).map(str::to_string);
            tracing::warn!(
                "{} {} failed with status {} ({})",
                method,
                path,
                response.status,
                error_key.as_deref().unwrap_or("no error key")
            );
            return Err(AdminError::Server {
                status: response.status,
                method,
                path,
                error_key,
            });
        }

        if let Some(alert) = response.header(&cfg.alert_header()) {
            let params = response.header(&cfg.params_header()).unwrap_or_default();
            tracing::info!("{} {}", alert, params);
        }

        Ok(response)
    }
}
