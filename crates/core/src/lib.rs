//! # HMS Core
//!
//! Client-side logic of the hospital management admin.
//!
//! This crate contains the typed CRUD front-end over the hospital management REST API:
//! - Entity definitions and the `Draft`/`Persisted` record model
//! - Typed resource clients over a pluggable [`Transport`](resource::Transport)
//! - View-state routing with authorization, data resolution and modal exit tables
//! - List, detail, dialog and delete controllers
//! - An in-process notification channel keeping open views in sync after a save
//!
//! **No server concerns**: the REST backend lives in `api-rest`, and command-line
//! rendering in `hms-cli`.

pub mod auth;
pub mod config;
pub mod constants;
pub mod controllers;
pub mod dates;
pub mod entities;
pub mod error;
pub mod events;
pub mod modal;
pub mod resource;
pub mod router;

#[cfg(test)]
mod testing;

pub use config::CoreConfig;
pub use error::{AdminError, AdminResult};
pub use events::{NotificationChannel, Subscription};
pub use resource::{Api, ResourceClient};
