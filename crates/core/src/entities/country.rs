use super::{Entity, NoLookups};
use crate::constants::ROLE_ADMIN;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Country {
    pub country: Option<String>,
}

impl Entity for Country {
    const NAME: &'static str = "country";
    const COLLECTION: &'static str = "countries";
    const AUTHORITIES: &'static [&'static str] = &[ROLE_ADMIN];
    type Lookups = NoLookups;
}
