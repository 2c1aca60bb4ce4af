use super::{lookup_all, Country, District, Entity, Lookups, Persisted, State};
use crate::constants::{ROLE_ADMIN, ROLE_USER};
use crate::resource::Api;
use crate::AdminResult;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A registered patient and their address.
///
/// The address references district, state and country records by nesting them; only the
/// nested `id` is significant when saving.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Patient {
    pub name: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    #[serde(with = "crate::dates::local_date")]
    pub date_of_birth: Option<NaiveDate>,
    pub district: Option<Persisted<District>>,
    pub state: Option<Persisted<State>>,
    pub country: Option<Persisted<Country>>,
}

impl Entity for Patient {
    const NAME: &'static str = "patient";
    const COLLECTION: &'static str = "patients";
    const AUTHORITIES: &'static [&'static str] = &[ROLE_USER, ROLE_ADMIN];
    type Lookups = PatientLookups;
}

/// Selection lists for the patient address fields.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PatientLookups {
    pub districts: Vec<Persisted<District>>,
    pub states: Vec<Persisted<State>>,
    pub countries: Vec<Persisted<Country>>,
}

#[async_trait]
impl Lookups for PatientLookups {
    async fn load(api: &Api) -> AdminResult<Self> {
        Ok(Self {
            districts: lookup_all::<District>(api).await,
            states: lookup_all::<State>(api).await,
            countries: lookup_all::<Country>(api).await,
        })
    }
}
