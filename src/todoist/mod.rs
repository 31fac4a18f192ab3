//! Todoist support, through its REST API and a personal API token

pub mod client;
pub mod types;

pub use client::TodoistClient;

/// Base URL of the Todoist REST API
pub const DEFAULT_API_BASE: &str = "https://api.todoist.com/rest/v2";
