use async_trait::async_trait;

use crate::container::{Container, ContainerId};
use crate::error::Error;
use crate::item::RawTask;
use crate::provider::ProviderKind;

/// Everything a dashboard needs from a provider
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
    pub containers: Vec<Container>,
    pub tasks: Vec<RawTask>,
}

/// A remote source of tasks
#[async_trait]
pub trait TaskSource {
    /// Which provider this source talks to
    fn kind(&self) -> ProviderKind;

    /// Returns the task lists (or projects) of this account
    async fn get_containers(&self) -> Result<Vec<Container>, Error>;

    /// Returns the tasks of a container, or of the whole account when `container` is `None`
    async fn get_tasks(&self, container: Option<&ContainerId>) -> Result<Vec<RawTask>, Error>;

    /// Fetch the containers, then the tasks of every container.
    ///
    /// An account without containers, or without any task, is reported as [`Error::EmptyResultSet`].
    async fn fetch(&self) -> Result<Snapshot, Error> {
        let containers = self.get_containers().await?;
        if containers.is_empty() {
            return Err(Error::EmptyResultSet(self.kind().no_containers_message().to_string()));
        }

        let mut tasks = Vec::new();
        for container in &containers {
            log::debug!("Fetching tasks of {} ({})", container.name(), container.id());
            tasks.extend(self.get_tasks(Some(container.id())).await?);
        }

        ensure_tasks(self.kind(), containers, tasks)
    }
}

/// Build a snapshot, unless there are no tasks at all
pub(crate) fn ensure_tasks(kind: ProviderKind, containers: Vec<Container>, tasks: Vec<RawTask>) -> Result<Snapshot, Error> {
    if tasks.is_empty() {
        return Err(Error::EmptyResultSet(kind.no_tasks_message().to_string()));
    }
    log::info!("Fetched {} tasks in {} containers from {}", tasks.len(), containers.len(), kind);
    Ok(Snapshot { containers, tasks })
}
