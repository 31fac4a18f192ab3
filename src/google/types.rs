//! Google Tasks API resources, as returned by the REST API

use serde::{Deserialize, Serialize};

/// A `tasklist` resource
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GoogleTaskList {
    pub id: String,
    #[serde(default)]
    pub title: String,
}

/// A `task` resource.
///
/// Every field may be missing. In particular, deleted tasks may come without a `title`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleTask {
    #[serde(default)]
    pub id: String,
    pub title: Option<String>,
    pub notes: Option<String>,
    /// RFC 3339 timestamp. Only the date part is meaningful
    pub due: Option<String>,
    /// RFC 3339 completion timestamp, absent for tasks that are not completed
    pub completed: Option<String>,
    pub updated: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TaskListsPage {
    pub items: Option<Vec<GoogleTaskList>>,
    pub next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TasksPage {
    pub items: Option<Vec<GoogleTask>>,
    pub next_page_token: Option<String>,
}
