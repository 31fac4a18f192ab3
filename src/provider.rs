//! The task providers this crate can display, and what differs between their dashboards

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Optional parts of a dashboard, that only make sense for some providers
    pub struct Features: u8 {
        /// Tasks carry a priority: priority filter, priority chart and priority columns
        const PRIORITY = 1;
        /// The detail table shows the completion date
        const COMPLETED_COLUMN = 2;
    }
}

/// A remote task service
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProviderKind {
    GoogleTasks,
    Todoist,
}

impl ProviderKind {
    pub fn name(&self) -> &'static str {
        match self {
            ProviderKind::GoogleTasks => "Google Tasks",
            ProviderKind::Todoist => "Todoist",
        }
    }

    pub fn features(&self) -> Features {
        match self {
            ProviderKind::GoogleTasks => Features::COMPLETED_COLUMN,
            ProviderKind::Todoist => Features::PRIORITY,
        }
    }

    pub fn dashboard_title(&self) -> &'static str {
        match self {
            ProviderKind::GoogleTasks => "Google Tasks Dashboard",
            ProviderKind::Todoist => "Todoist tasks",
        }
    }

    /// What a container is called for this provider ("List" or "Project")
    pub fn grouping_label(&self) -> &'static str {
        match self {
            ProviderKind::GoogleTasks => "List",
            ProviderKind::Todoist => "Project",
        }
    }

    pub fn grouping_select_label(&self) -> &'static str {
        match self {
            ProviderKind::GoogleTasks => "Select Task List",
            ProviderKind::Todoist => "Select Project",
        }
    }

    pub fn grouping_chart_title(&self) -> &'static str {
        match self {
            ProviderKind::GoogleTasks => "Tasks per List",
            ProviderKind::Todoist => "Tasks per Project",
        }
    }

    pub fn grouping_subheader(&self) -> &'static str {
        match self {
            ProviderKind::GoogleTasks => "Tasks by List",
            ProviderKind::Todoist => "Tasks by project",
        }
    }

    pub fn status_subheader(&self) -> &'static str {
        match self {
            ProviderKind::GoogleTasks => "Tasks by Status",
            ProviderKind::Todoist => "Tasks by status",
        }
    }

    pub fn status_chart_title(&self) -> &'static str {
        match self {
            ProviderKind::GoogleTasks => "Task Status Distribution",
            ProviderKind::Todoist => "Task status distribution",
        }
    }

    /// Warning shown when the account has no containers
    pub fn no_containers_message(&self) -> &'static str {
        match self {
            ProviderKind::GoogleTasks => "No task lists found!",
            ProviderKind::Todoist => "No projects found in your Todoist account.",
        }
    }

    /// Warning shown when the account has no tasks at all
    pub fn no_tasks_message(&self) -> &'static str {
        match self {
            ProviderKind::GoogleTasks => "No tasks found in your task lists.",
            ProviderKind::Todoist => "No tasks found in your Todoist account.",
        }
    }
}

impl Display for ProviderKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "google" | "google-tasks" | "gtasks" => Ok(ProviderKind::GoogleTasks),
            "todoist" => Ok(ProviderKind::Todoist),
            other => Err(format!("Unknown provider '{}' (expected 'google' or 'todoist')", other)),
        }
    }
}
