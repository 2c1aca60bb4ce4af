use super::states::{StateDef, StateKind, StateRegistry, TargetState};
use super::url::Params;
use crate::auth::AuthGuard;
use crate::entities::EntityId;
use crate::modal::ModalOutcome;
use crate::{AdminError, AdminResult};
use serde::Serialize;
use std::sync::Arc;

/// Snapshot of the state being left, handed to the next view for its "back" link.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PreviousState {
    pub name: String,
    pub params: Params,
    pub url: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActiveState {
    pub state: Arc<StateDef>,
    pub params: Params,
    pub url: String,
}

impl ActiveState {
    fn snapshot(&self) -> PreviousState {
        PreviousState {
            name: self.state.name.clone(),
            params: self.params.clone(),
            url: self.url.clone(),
        }
    }

    fn shows(&self, state: &StateDef, params: &Params) -> bool {
        self.state.name == state.name && &self.params == params
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GoOptions {
    /// Re-resolve the target even if it is already rendered.
    pub reload: bool,
}

impl GoOptions {
    pub fn reload() -> Self {
        Self { reload: true }
    }
}

/// An accepted navigation, ready to be activated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transition {
    pub state: Arc<StateDef>,
    pub params: Params,
    pub url: String,
    pub previous: PreviousState,
    pub reload: bool,
    /// The target view is already rendered; the caller keeps it instead of activating.
    pub retained: bool,
}

impl Transition {
    pub fn id_param(&self) -> AdminResult<EntityId> {
        let raw = self
            .params
            .get("id")
            .ok_or_else(|| AdminError::MissingParam("id".into()))?;
        raw.parse().map_err(|_| AdminError::InvalidParam {
            name: "id".into(),
            value: raw.clone(),
        })
    }

    pub fn opens_modal(&self) -> bool {
        self.state.kind.is_modal()
    }
}

/// Tracks the active state and turns navigation requests into [`Transition`]s.
///
/// Entering a state does not change the active state; [`commit`](Self::commit) does.
///
/// Modal states open over the view that was rendered when they were entered; that view
/// stays the rendered one until a non-modal state is entered.
#[derive(Debug)]
pub struct Navigator {
    registry: Arc<StateRegistry>,
    guard: AuthGuard,
    current: Option<ActiveState>,
    rendered: Option<ActiveState>,
}

impl Navigator {
    pub fn new(registry: Arc<StateRegistry>, guard: AuthGuard) -> Self {
        Self {
            registry,
            guard,
            current: None,
            rendered: None,
        }
    }

    pub fn registry(&self) -> &StateRegistry {
        &self.registry
    }

    pub fn current(&self) -> Option<&ActiveState> {
        self.current.as_ref()
    }

    /// Navigate to the state matching `url`.
    pub fn go_url(&mut self, url: &str, options: GoOptions) -> AdminResult<Transition> {
        let (state, params) = self.registry.match_url(url)?;
        self.enter(state, params, options)
    }

    /// Navigate to a named state.
    pub fn go(&mut self, name: &str, params: Params, options: GoOptions) -> AdminResult<Transition> {
        let state = self.registry.get(name)?;
        self.enter(state, params, options)
    }

    /// Follow the exit table of a modal state once its modal has resolved.
    pub fn exit_modal(
        &mut self,
        transition: &Transition,
        outcome: ModalOutcome,
    ) -> AdminResult<Transition> {
        let state = &transition.state;
        let exit = state
            .exit
            .as_ref()
            .ok_or_else(|| AdminError::NotModal(state.name.clone()))?;
        let target = match outcome {
            ModalOutcome::Confirmed => &exit.on_confirm,
            ModalOutcome::Cancelled => &exit.on_cancel,
        };

        let name = match &target.state {
            TargetState::Parent => state
                .parent
                .clone()
                .ok_or_else(|| AdminError::NotModal(state.name.clone()))?,
            TargetState::Named(name) => name.clone(),
        };
        let target_state = self.registry.get(&name)?;
        let params = transition
            .params
            .iter()
            .filter(|(key, _)| target_state.url.param_names().any(|p| p == key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        tracing::debug!("{} {:?} -> {}", state.name, outcome, name);
        self.enter(target_state, params, GoOptions { reload: target.reload })
    }

    fn enter(
        &mut self,
        state: Arc<StateDef>,
        params: Params,
        options: GoOptions,
    ) -> AdminResult<Transition> {
        if state.kind == StateKind::Abstract {
            return Err(AdminError::AbstractState(state.name.clone()));
        }
        self.guard.check(&state)?;

        let url = state.url.format(&params)?;
        let previous = match &self.current {
            Some(active) => active.snapshot(),
            None => self.default_previous(&state)?,
        };
        let retained = !options.reload
            && !state.kind.is_modal()
            && self
                .rendered
                .as_ref()
                .is_some_and(|rendered| rendered.shows(&state, &params));

        tracing::debug!("entering {} at {}", state.name, url);
        Ok(Transition {
            state,
            params,
            url,
            previous,
            reload: options.reload,
            retained,
        })
    }

    /// Record `transition` as the active state.
    ///
    /// Call once its activation has succeeded, or straight away for a retained
    /// transition. A transition that is never committed leaves the navigator where it
    /// was, so the next one still snapshots the last state actually shown.
    pub fn commit(&mut self, transition: &Transition) {
        let active = ActiveState {
            state: Arc::clone(&transition.state),
            params: transition.params.clone(),
            url: transition.url.clone(),
        };
        if !transition.state.kind.is_modal() {
            self.rendered = Some(active.clone());
        }
        self.current = Some(active);
    }

    /// The entity's list state, used when nothing has been rendered yet.
    fn default_previous(&self, state: &StateDef) -> AdminResult<PreviousState> {
        let name = state.entity.unwrap_or(state.name.as_str()).to_string();
        let url = match self.registry.get(&name) {
            Ok(list) => list.url.format(&Params::new())?,
            Err(_) => state.url.to_string(),
        };
        Ok(PreviousState {
            name,
            params: Params::new(),
            url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{Authority, Principal, StaticPrincipal};
    use crate::constants::{ROLE_ADMIN, ROLE_USER};
    use crate::testing::test_config;

    fn navigator(roles: &[&str]) -> Navigator {
        let registry = Arc::new(StateRegistry::for_application(&test_config()).unwrap());
        let principal = Principal::new("admin", roles.iter().map(|r| Authority::new(r).unwrap()));
        let guard = AuthGuard::new(Arc::new(StaticPrincipal::signed_in(principal)));
        Navigator::new(registry, guard)
    }

    /// Enter and commit, as a caller does once the view has been activated.
    fn visit(nav: &mut Navigator, url: &str) -> Transition {
        let t = nav.go_url(url, GoOptions::default()).unwrap();
        nav.commit(&t);
        t
    }

    fn id(value: &str) -> Params {
        Params::from([("id".to_string(), value.to_string())])
    }

    #[test]
    fn test_first_transition_defaults_previous_to_list() {
        let mut nav = navigator(&[ROLE_ADMIN]);
        let t = nav.go_url("/state/7/edit", GoOptions::default()).unwrap();

        assert_eq!(t.state.name, "state.edit");
        assert_eq!(t.id_param().unwrap(), 7);
        assert!(t.opens_modal());
        assert_eq!(
            t.previous,
            PreviousState {
                name: "state".into(),
                params: Params::new(),
                url: "/state".into(),
            }
        );
    }

    #[test]
    fn test_previous_is_the_state_being_left() {
        let mut nav = navigator(&[ROLE_ADMIN]);
        visit(&mut nav, "/state");
        let t = nav.go("state-detail", id("3"), GoOptions::default()).unwrap();
        assert_eq!(t.url, "/state/3");
        assert_eq!(t.previous.name, "state");
        assert_eq!(nav.current().unwrap().url, "/state");

        nav.commit(&t);
        assert_eq!(nav.current().unwrap().url, "/state/3");
    }

    #[test]
    fn test_cancel_returns_to_rendered_view_without_reload() {
        let mut nav = navigator(&[ROLE_ADMIN]);
        visit(&mut nav, "/state");
        let edit = visit(&mut nav, "/state/7/edit");

        let back = nav.exit_modal(&edit, ModalOutcome::Cancelled).unwrap();
        assert_eq!(back.state.name, "state");
        assert!(back.params.is_empty());
        assert!(!back.reload);
        assert!(back.retained);
    }

    #[test]
    fn test_confirm_reloads_list() {
        let mut nav = navigator(&[ROLE_ADMIN]);
        visit(&mut nav, "/state");
        let new = visit(&mut nav, "/state/new");

        let next = nav.exit_modal(&new, ModalOutcome::Confirmed).unwrap();
        assert_eq!(next.state.name, "state");
        assert!(next.reload);
        assert!(!next.retained);
    }

    #[test]
    fn test_detail_edit_returns_to_detail_without_reload() {
        let mut nav = navigator(&[ROLE_ADMIN]);
        visit(&mut nav, "/state/3");
        let edit = visit(&mut nav, "/state/3/detail/edit");
        assert_eq!(edit.previous.url, "/state/3");

        let back = nav.exit_modal(&edit, ModalOutcome::Confirmed).unwrap();
        assert_eq!(back.state.name, "state-detail");
        assert_eq!(back.params, id("3"));
        assert!(!back.reload);
        assert!(back.retained);
    }

    #[test]
    fn test_uncommitted_transition_leaves_navigator_unchanged() {
        let mut nav = navigator(&[ROLE_ADMIN]);
        visit(&mut nav, "/state");

        // Activation of the detail view failed, so it is never committed.
        let failed = nav.go_url("/state/9", GoOptions::default()).unwrap();
        assert!(!failed.retained);
        assert_eq!(nav.current().unwrap().url, "/state");

        let again = nav.go_url("/state/9", GoOptions::default()).unwrap();
        assert!(!again.retained);
        assert_eq!(again.previous.url, "/state");
    }

    #[test]
    fn test_exit_modal_rejects_non_modal_state() {
        let mut nav = navigator(&[ROLE_ADMIN]);
        let list = nav.go("state", Params::new(), GoOptions::default()).unwrap();
        let err = nav.exit_modal(&list, ModalOutcome::Confirmed).unwrap_err();
        assert!(matches!(err, AdminError::NotModal(name) if name == "state"));
    }

    #[test]
    fn test_authorization_rejected_before_state_changes() {
        let mut nav = navigator(&[ROLE_USER]);
        let err = nav.go_url("/state", GoOptions::default()).unwrap_err();
        assert!(err.is_authorization());
        assert!(nav.current().is_none());

        assert!(nav.go_url("/patient", GoOptions::default()).is_ok());
    }

    #[test]
    fn test_abstract_and_unparameterised_states_are_rejected() {
        let mut nav = navigator(&[ROLE_ADMIN]);
        assert!(matches!(
            nav.go("entity", Params::new(), GoOptions::default()),
            Err(AdminError::AbstractState(_))
        ));
        assert!(matches!(
            nav.go("state-detail", Params::new(), GoOptions::default()),
            Err(AdminError::MissingParam(_))
        ));
    }

    #[test]
    fn test_id_param_must_be_numeric() {
        let mut nav = navigator(&[ROLE_ADMIN]);
        let t = nav.go_url("/state/abc", GoOptions::default()).unwrap();
        assert!(matches!(t.id_param(), Err(AdminError::InvalidParam { .. })));
    }
}
