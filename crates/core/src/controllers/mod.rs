//! View controllers.
//!
//! One controller per view kind. Each owns the state of its view; the only state shared
//! between views is the [`NotificationChannel`](crate::events::NotificationChannel),
//! through which a saved entity reaches every open detail view.

mod delete;
mod detail;
mod dialog;
mod list;

pub use delete::DeleteController;
pub use detail::DetailController;
pub use dialog::DialogController;
pub use list::ListController;
