use super::{Entity, NoLookups};
use crate::constants::ROLE_ADMIN;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct District {
    pub district: Option<String>,
}

impl Entity for District {
    const NAME: &'static str = "district";
    const COLLECTION: &'static str = "districts";
    const AUTHORITIES: &'static [&'static str] = &[ROLE_ADMIN];
    type Lookups = NoLookups;
}
