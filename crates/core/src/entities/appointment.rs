use super::{lookup_all, Entity, Lookups, Patient, Persisted};
use crate::constants::{ROLE_ADMIN, ROLE_USER};
use crate::resource::Api;
use crate::AdminResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A scheduled appointment for a patient.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Appointment {
    #[serde(with = "crate::dates::date_time")]
    pub date: Option<DateTime<Utc>>,
    pub patient: Option<Persisted<Patient>>,
}

impl Entity for Appointment {
    const NAME: &'static str = "appointment";
    const COLLECTION: &'static str = "appointments";
    const AUTHORITIES: &'static [&'static str] = &[ROLE_USER, ROLE_ADMIN];
    type Lookups = AppointmentLookups;
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct AppointmentLookups {
    pub patients: Vec<Persisted<Patient>>,
}

#[async_trait]
impl Lookups for AppointmentLookups {
    async fn load(api: &Api) -> AdminResult<Self> {
        Ok(Self {
            patients: lookup_all::<Patient>(api).await,
        })
    }
}
