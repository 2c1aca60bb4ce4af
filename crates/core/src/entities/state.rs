use super::{Entity, NoLookups};
use crate::constants::ROLE_ADMIN;
use serde::{Deserialize, Serialize};

/// A state of a country, used in patient addresses.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct State {
    pub state: Option<String>,
}

impl Entity for State {
    const NAME: &'static str = "state";
    const COLLECTION: &'static str = "states";
    const AUTHORITIES: &'static [&'static str] = &[ROLE_ADMIN];
    type Lookups = NoLookups;
}
