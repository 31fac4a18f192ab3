//! This crate provides dashboards for task data stored in Google Tasks or Todoist.
//!
//! Tasks are fetched by a [`TaskSource`](traits::TaskSource): [`google::GoogleTasksClient`] or [`todoist::TodoistClient`]. \
//! Their raw records ([`item::RawTask`]) are then normalized into a single [`TaskTable`](task::TaskTable) shape,
//! and every task gets a derived [`Status`](task::Status).
//!
//! The [`dashboard`] module computes views out of this table (counts per status, per task list or project,
//! completions over time, upcoming tasks and a filterable detail table), and renders them as terminal text or JSON. \
//! The [`page`] module ties all of this together: authentication, fetching, a memoized normalization, and rendering.

pub mod traits;
pub mod error;
pub use error::Error;

pub mod provider;
pub use provider::ProviderKind;
pub mod container;
pub mod item;
pub mod task;
pub use task::{Status, Task, TaskTable};

pub mod client;
pub mod google;
pub mod todoist;
pub mod credentials;

pub mod cache;
pub mod dashboard;
pub mod page;

pub mod config;
pub mod utils;

pub mod mock_behaviour;
pub mod mock_source;
