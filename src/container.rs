//! Containers group tasks: task lists for Google Tasks, projects for Todoist

use std::collections::HashMap;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Name used for a task whose container is unknown
pub const UNKNOWN_CONTAINER_NAME: &str = "Unknown";

/// An opaque, provider-assigned container identifier
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContainerId {
    content: String,
}

impl ContainerId {
    pub fn as_str(&self) -> &str {
        &self.content
    }
}

impl From<String> for ContainerId {
    fn from(content: String) -> Self {
        Self { content }
    }
}
impl From<&str> for ContainerId {
    fn from(content: &str) -> Self {
        Self { content: content.to_string() }
    }
}

impl Display for ContainerId {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        write!(f, "{}", self.content)
    }
}


/// A task list or a project
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Container {
    id: ContainerId,
    name: String,
}

impl Container {
    pub fn new<I: Into<ContainerId>, S: ToString>(id: I, name: S) -> Self {
        Self { id: id.into(), name: name.to_string() }
    }

    pub fn id(&self) -> &ContainerId { &self.id   }
    pub fn name(&self) -> &str       { &self.name }
}


/// Resolves container IDs into their display names.
///
/// This is rebuilt from the fetched containers every time a page is rendered.
#[derive(Clone, Debug, Default)]
pub struct NameLookup {
    names: HashMap<ContainerId, String>,
}

impl NameLookup {
    pub fn new(containers: &[Container]) -> Self {
        let names = containers.iter()
            .map(|c| (c.id().clone(), c.name().to_string()))
            .collect();
        Self { names }
    }

    /// The name of this container, or `"Unknown"` if it is not part of the fetched containers
    pub fn resolve(&self, id: &ContainerId) -> &str {
        self.names
            .get(id)
            .map(|name| name.as_str())
            .unwrap_or(UNKNOWN_CONTAINER_NAME)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unresolved_ids_are_unknown() {
        let lookup = NameLookup::new(&[
            Container::new("inbox", "Inbox"),
            Container::new("work", "Work"),
        ]);

        assert_eq!(lookup.resolve(&ContainerId::from("work")), "Work");
        assert_eq!(lookup.resolve(&ContainerId::from("deleted-list")), "Unknown");
    }

    #[test]
    fn later_duplicates_win() {
        let lookup = NameLookup::new(&[
            Container::new("a", "First"),
            Container::new("a", "Second"),
        ]);
        assert_eq!(lookup.resolve(&ContainerId::from("a")), "Second");
    }
}
