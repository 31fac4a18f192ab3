//! Raw task records, as fetched from a provider

use serde::{Deserialize, Serialize};

use crate::container::ContainerId;
use crate::google::types::GoogleTask;
use crate::provider::ProviderKind;
use crate::todoist::types::TodoistTask;


/// A task record, as the provider sent it, tagged by provider.
///
/// Google Tasks records do not know their task list, so it is stored alongside.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum RawTask {
    GoogleTasks { list_id: ContainerId, task: GoogleTask },
    Todoist(TodoistTask),
}

/// Returns the same property of the inner record, whatever the provider
macro_rules! synthetise_common_getter {
    ($property_name:ident, $return_type:ty, |$g:ident| $google:expr, |$t:ident| $todoist:expr) => {
        pub fn $property_name(&self) -> $return_type {
            match self {
                RawTask::GoogleTasks { task: $g, .. } => $google,
                RawTask::Todoist($t) => $todoist,
            }
        }
    }
}

impl RawTask {
    synthetise_common_getter!(id, &str, |t| t.id.as_str(), |t| t.id.as_str());
    synthetise_common_getter!(title, Option<&str>, |t| t.title.as_deref(), |t| Some(t.content.as_str()));

    pub fn container_id(&self) -> ContainerId {
        match self {
            RawTask::GoogleTasks { list_id, .. } => list_id.clone(),
            RawTask::Todoist(task) => ContainerId::from(task.project_id.as_str()),
        }
    }

    pub fn provider(&self) -> ProviderKind {
        match self {
            RawTask::GoogleTasks { .. } => ProviderKind::GoogleTasks,
            RawTask::Todoist(_) => ProviderKind::Todoist,
        }
    }
}
