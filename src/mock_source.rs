//! An in-memory task source, for tests
#![cfg(any(test, feature = "mock_sources"))]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::container::{Container, ContainerId};
use crate::error::Error;
use crate::item::RawTask;
use crate::mock_behaviour::MockBehaviour;
use crate::provider::ProviderKind;
use crate::traits::{ensure_tasks, Snapshot, TaskSource};

/// A [`TaskSource`] that serves fixed records, and fails according to a [`MockBehaviour`]
pub struct MockSource {
    kind: ProviderKind,
    containers: Vec<Container>,
    tasks: Vec<RawTask>,
    behaviour: Arc<Mutex<MockBehaviour>>,
}

impl MockSource {
    pub fn new(kind: ProviderKind, containers: Vec<Container>, tasks: Vec<RawTask>) -> Self {
        Self::new_with_behaviour(kind, containers, tasks, Arc::new(Mutex::new(MockBehaviour::new())))
    }

    pub fn new_with_behaviour(kind: ProviderKind, containers: Vec<Container>, tasks: Vec<RawTask>, behaviour: Arc<Mutex<MockBehaviour>>) -> Self {
        Self { kind, containers, tasks, behaviour }
    }

    fn behaviour(&self) -> std::sync::MutexGuard<'_, MockBehaviour> {
        match self.behaviour.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[async_trait]
impl TaskSource for MockSource {
    fn kind(&self) -> ProviderKind {
        self.kind
    }

    async fn get_containers(&self) -> Result<Vec<Container>, Error> {
        self.behaviour().can_get_containers()?;
        Ok(self.containers.clone())
    }

    async fn get_tasks(&self, container: Option<&ContainerId>) -> Result<Vec<RawTask>, Error> {
        self.behaviour().can_get_tasks()?;
        Ok(self.tasks.iter()
            .filter(|task| match container {
                None => true,
                Some(id) => &task.container_id() == id,
            })
            .cloned()
            .collect())
    }

    /// Same request pattern as the real clients: one task request per task list for Google Tasks,
    /// a single one for Todoist
    async fn fetch(&self) -> Result<Snapshot, Error> {
        let containers = self.get_containers().await?;
        if containers.is_empty() {
            return Err(Error::EmptyResultSet(self.kind.no_containers_message().to_string()));
        }

        let tasks = match self.kind {
            ProviderKind::Todoist => self.get_tasks(None).await?,
            ProviderKind::GoogleTasks => {
                let mut tasks = Vec::new();
                for container in &containers {
                    tasks.extend(self.get_tasks(Some(container.id())).await?);
                }
                tasks
            },
        };
        ensure_tasks(self.kind, containers, tasks)
    }
}
