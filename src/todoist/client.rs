//! A client for the Todoist REST API

use async_trait::async_trait;
use url::Url;

use crate::client::{endpoint, get_json, http_client, parse_base_url};
use crate::container::{Container, ContainerId};
use crate::error::Error;
use crate::item::RawTask;
use crate::provider::ProviderKind;
use crate::todoist::types::{TodoistProject, TodoistTask};
use crate::traits::{ensure_tasks, Snapshot, TaskSource};

/// A [`TaskSource`] that reads projects and active tasks from Todoist
pub struct TodoistClient {
    api_base: Url,
    api_token: String,
    http: reqwest::Client,
}

impl TodoistClient {
    /// Create a client. This does not start a connection
    pub fn new<S: AsRef<str>, T: ToString>(api_base: S, api_token: T) -> Result<Self, Error> {
        Ok(Self {
            api_base: parse_base_url(api_base.as_ref())?,
            api_token: api_token.to_string(),
            http: http_client()?,
        })
    }

    pub async fn get_projects(&self) -> Result<Vec<TodoistProject>, Error> {
        let url = endpoint(&self.api_base, &["projects"])?;
        let projects: Vec<TodoistProject> = get_json(&self.http, url, &self.api_token, &[]).await?;
        log::debug!("Found {} projects", projects.len());
        Ok(projects)
    }

    /// Returns the tasks of a project, or of every project
    pub async fn get_project_tasks(&self, project_id: Option<&ContainerId>) -> Result<Vec<TodoistTask>, Error> {
        let url = endpoint(&self.api_base, &["tasks"])?;
        let query: Vec<(&str, String)> = match project_id {
            Some(id) => vec![("project_id", id.to_string())],
            None => Vec::new(),
        };
        let tasks: Vec<TodoistTask> = get_json(&self.http, url, &self.api_token, &query).await?;
        log::debug!("Found {} tasks", tasks.len());
        Ok(tasks)
    }
}

#[async_trait]
impl TaskSource for TodoistClient {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Todoist
    }

    async fn get_containers(&self) -> Result<Vec<Container>, Error> {
        let projects = self.get_projects().await?;
        Ok(projects.into_iter()
            .map(|project| Container::new(project.id, project.name))
            .collect())
    }

    async fn get_tasks(&self, container: Option<&ContainerId>) -> Result<Vec<RawTask>, Error> {
        let tasks = self.get_project_tasks(container).await?;
        Ok(tasks.into_iter().map(RawTask::Todoist).collect())
    }

    /// Todoist can list the tasks of the whole account at once, so this takes two requests only
    async fn fetch(&self) -> Result<Snapshot, Error> {
        let containers = self.get_containers().await?;
        if containers.is_empty() {
            return Err(Error::EmptyResultSet(self.kind().no_containers_message().to_string()));
        }

        let tasks = self.get_tasks(None).await?;
        ensure_tasks(self.kind(), containers, tasks)
    }
}
