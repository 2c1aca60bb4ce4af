//! Hospital management entities.
//!
//! Every entity is a plain field struct implementing [`Entity`]. The identifier is not a
//! field: it lives in [`Persisted`], and an unsaved record is a [`Record::Draft`].
//!
//! Relationships are nested references (`Option<Persisted<District>>`). Dialogs that edit
//! a relationship load the referenced collections through the entity's [`Lookups`].

mod appointment;
mod country;
mod district;
mod patient;
mod record;
mod state;

pub use appointment::{Appointment, AppointmentLookups};
pub use country::Country;
pub use district::District;
pub use patient::{Patient, PatientLookups};
pub use record::{EntityId, Persisted, Record};
pub use state::State;

use crate::resource::Api;
use crate::AdminResult;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;

/// A CRUD-managed entity type.
pub trait Entity:
    Clone + Debug + Default + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Singular name used in state names, URLs and event names, e.g. `state`.
    const NAME: &'static str;

    /// Collection segment of the REST resource, e.g. `states`.
    const COLLECTION: &'static str;

    /// Authorities allowed to navigate to this entity's states.
    const AUTHORITIES: &'static [&'static str];

    /// Reference lists the edit dialog needs for its selection fields.
    type Lookups: Lookups;
}

/// Reference data fetched eagerly when an edit dialog opens.
#[async_trait]
pub trait Lookups: Debug + Default + Send + Sync + Sized {
    async fn load(api: &Api) -> AdminResult<Self>;
}

/// Lookups of an entity without relationships.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NoLookups;

#[async_trait]
impl Lookups for NoLookups {
    async fn load(_api: &Api) -> AdminResult<Self> {
        Ok(NoLookups)
    }
}

/// Fetch a reference collection for a selection field.
///
/// A failed lookup leaves the selection empty rather than blocking the dialog.
pub(crate) async fn lookup_all<E: Entity>(api: &Api) -> Vec<Persisted<E>> {
    match api.resource::<E>().query(None).await {
        Ok(page) => page.items,
        Err(e) => {
            tracing::warn!("failed to load {} lookup list: {}", E::NAME, e);
            Vec::new()
        }
    }
}

/// Names of every entity managed by the admin, in menu order.
pub const ENTITY_NAMES: &[&str] = &[
    Appointment::NAME,
    Patient::NAME,
    State::NAME,
    District::NAME,
    Country::NAME,
];
