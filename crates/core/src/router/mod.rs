//! View-state routing.
//!
//! Navigation runs in three steps:
//!
//! 1. [`Navigator`] turns a URL or state name into a [`Transition`], rejecting states the
//!    principal may not enter before anything is fetched.
//! 2. [`StateResolver::activate`] fetches the state's data and returns an [`Activation`]:
//!    a rendered list or detail view, or a modal dialog paired with its pending result.
//! 3. Once a modal resolves, [`Navigator::exit_modal`] maps the outcome through the
//!    state's exit table to the next transition.
//!
//! The states themselves live in a [`StateRegistry`]: per entity `x`, the list `x`, the
//! detail `x-detail`, and the modal states `x.new`, `x.edit`, `x.delete` and
//! `x-detail.edit`, all under the abstract `entity` root.

mod navigator;
mod resolver;
mod states;
mod url;

pub use navigator::{ActiveState, GoOptions, Navigator, PreviousState, Transition};
pub use resolver::{Activation, StateResolver};
pub use states::{
    entity_states, ExitTarget, ModalExit, Resolve, StateDef, StateKind, StateRegistry,
    TargetState,
};
pub use url::{Params, UrlPattern};
