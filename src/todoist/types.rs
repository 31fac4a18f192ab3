//! Todoist REST API resources

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TodoistProject {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// The due date of a task. `date` is `YYYY-MM-DD`, or a full timestamp for tasks due at a given time
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TodoistDue {
    pub date: String,
    #[serde(default)]
    pub string: Option<String>,
    #[serde(default)]
    pub datetime: Option<String>,
    #[serde(default)]
    pub is_recurring: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TodoistTask {
    pub id: String,
    #[serde(default)]
    pub project_id: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_completed: bool,
    /// From 1 (normal) to 4 (urgent)
    #[serde(default = "default_priority")]
    pub priority: u8,
    #[serde(default)]
    pub due: Option<TodoistDue>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub completed_at: Option<String>,
}

fn default_priority() -> u8 {
    1
}
