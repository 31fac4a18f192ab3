//! Google Tasks support: REST client and OAuth authentication

pub mod auth;
pub mod client;
pub mod types;

pub use auth::GoogleAuthenticator;
pub use client::GoogleTasksClient;

/// Base URL of the Google Tasks API
pub const DEFAULT_API_BASE: &str = "https://tasks.googleapis.com/tasks/v1";
