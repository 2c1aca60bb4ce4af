//! Authorities and the navigation guard.
//!
//! Who the current user is comes from outside this crate through [`PrincipalSource`].
//! The guard only answers whether the principal may enter a state: a state with no
//! declared authorities is public, otherwise the principal needs at least one of them.

use crate::router::StateDef;
use crate::{AdminError, AdminResult};
use hms_types::NonEmptyText;
use std::collections::BTreeSet;
use std::sync::Arc;

/// A named role, e.g. `ROLE_ADMIN`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Authority(NonEmptyText);

impl Authority {
    pub fn new(name: impl AsRef<str>) -> AdminResult<Self> {
        Ok(Self(NonEmptyText::new(name)?))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Display for Authority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// The authenticated user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Principal {
    pub login: String,
    authorities: BTreeSet<Authority>,
}

impl Principal {
    pub fn new(login: impl Into<String>, authorities: impl IntoIterator<Item = Authority>) -> Self {
        Self {
            login: login.into(),
            authorities: authorities.into_iter().collect(),
        }
    }

    pub fn authorities(&self) -> impl Iterator<Item = &Authority> {
        self.authorities.iter()
    }

    pub fn has_any_authority(&self, required: &[Authority]) -> bool {
        required.iter().any(|a| self.authorities.contains(a))
    }
}

/// Supplies the current principal, if anyone is signed in.
pub trait PrincipalSource: Send + Sync {
    fn principal(&self) -> Option<Principal>;
}

/// A principal fixed at construction, e.g. from command-line flags.
#[derive(Clone, Debug, Default)]
pub struct StaticPrincipal(Option<Principal>);

impl StaticPrincipal {
    pub fn signed_in(principal: Principal) -> Self {
        Self(Some(principal))
    }

    pub fn anonymous() -> Self {
        Self(None)
    }
}

impl PrincipalSource for StaticPrincipal {
    fn principal(&self) -> Option<Principal> {
        self.0.clone()
    }
}

/// Rejects navigation to states the principal may not enter.
#[derive(Clone)]
pub struct AuthGuard {
    source: Arc<dyn PrincipalSource>,
}

impl AuthGuard {
    pub fn new(source: Arc<dyn PrincipalSource>) -> Self {
        Self { source }
    }

    pub fn check(&self, state: &StateDef) -> AdminResult<()> {
        if state.authorities.is_empty() {
            return Ok(());
        }

        let Some(principal) = self.source.principal() else {
            tracing::debug!("anonymous navigation to {} rejected", state.name);
            return Err(AdminError::Unauthenticated(state.name.clone()));
        };

        if principal.has_any_authority(&state.authorities) {
            return Ok(());
        }

        tracing::debug!("{} lacks the authorities for {}", principal.login, state.name);
        Err(AdminError::AccessDenied {
            state: state.name.clone(),
            required: state
                .authorities
                .iter()
                .map(|a| a.as_str().to_string())
                .collect(),
        })
    }
}

impl std::fmt::Debug for AuthGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthGuard").finish_non_exhaustive()
    }
}
