//! A client for the Google Tasks REST API

use async_trait::async_trait;
use url::Url;

use crate::client::{endpoint, get_json, http_client, parse_base_url};
use crate::container::{Container, ContainerId};
use crate::error::Error;
use crate::google::types::{GoogleTask, GoogleTaskList, TaskListsPage, TasksPage};
use crate::item::RawTask;
use crate::provider::ProviderKind;
use crate::traits::TaskSource;

/// The largest page the API accepts
const PAGE_SIZE: &str = "100";

/// A [`TaskSource`] that reads task lists and tasks from Google Tasks
pub struct GoogleTasksClient {
    api_base: Url,
    access_token: String,
    http: reqwest::Client,
}

impl GoogleTasksClient {
    /// Create a client. This does not start a connection
    pub fn new<S: AsRef<str>, T: ToString>(api_base: S, access_token: T) -> Result<Self, Error> {
        Ok(Self {
            api_base: parse_base_url(api_base.as_ref())?,
            access_token: access_token.to_string(),
            http: http_client()?,
        })
    }

    /// Returns every task list of the account, following pagination
    pub async fn get_task_lists(&self) -> Result<Vec<GoogleTaskList>, Error> {
        let url = endpoint(&self.api_base, &["users", "@me", "lists"])?;

        let mut lists = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let query = page_query(&[], &page_token);
            let page: TaskListsPage = get_json(&self.http, url.clone(), &self.access_token, &query).await?;
            lists.extend(page.items.unwrap_or_default());

            page_token = match page.next_page_token {
                Some(token) if token.is_empty() == false => Some(token),
                _ => break,
            };
        }
        log::debug!("Found {} task lists", lists.len());
        Ok(lists)
    }

    /// Returns every task of a list, including completed and hidden ones
    pub async fn get_list_tasks(&self, list_id: &ContainerId) -> Result<Vec<GoogleTask>, Error> {
        let url = endpoint(&self.api_base, &["lists", list_id.as_str(), "tasks"])?;
        let filters = [("showCompleted", "true"), ("showHidden", "true")];

        let mut tasks = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let query = page_query(&filters, &page_token);
            let page: TasksPage = get_json(&self.http, url.clone(), &self.access_token, &query).await?;
            tasks.extend(page.items.unwrap_or_default());

            page_token = match page.next_page_token {
                Some(token) if token.is_empty() == false => Some(token),
                _ => break,
            };
        }
        log::debug!("Found {} tasks in list {}", tasks.len(), list_id);
        Ok(tasks)
    }
}

fn page_query(filters: &[(&'static str, &str)], page_token: &Option<String>) -> Vec<(&'static str, String)> {
    let mut query: Vec<(&'static str, String)> = filters.iter()
        .map(|(k, v)| (*k, v.to_string()))
        .collect();
    query.push(("maxResults", PAGE_SIZE.to_string()));
    if let Some(token) = page_token {
        query.push(("pageToken", token.clone()));
    }
    query
}

#[async_trait]
impl TaskSource for GoogleTasksClient {
    fn kind(&self) -> ProviderKind {
        ProviderKind::GoogleTasks
    }

    async fn get_containers(&self) -> Result<Vec<Container>, Error> {
        let lists = self.get_task_lists().await?;
        Ok(lists.into_iter()
            .map(|list| Container::new(list.id, list.title))
            .collect())
    }

    /// Google Tasks has no account-wide task listing: `container` is required
    async fn get_tasks(&self, container: Option<&ContainerId>) -> Result<Vec<RawTask>, Error> {
        let list_id = match container {
            Some(id) => id,
            None => return Err(Error::Transport("Google Tasks can only list the tasks of a given task list".to_string())),
        };

        let tasks = self.get_list_tasks(list_id).await?;
        Ok(tasks.into_iter()
            .map(|task| RawTask::GoogleTasks { list_id: list_id.clone(), task })
            .collect())
    }
}
