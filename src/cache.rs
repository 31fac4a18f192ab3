//! This module memoizes the normalized task table, so that re-rendering a page with other filters
//! does not normalize the same records again

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;

use crate::container::Container;
use crate::error::Error;
use crate::item::RawTask;
use crate::provider::ProviderKind;
use crate::task::{normalize_all, TaskTable};


/// A single-entry cache of [`normalize_all`], keyed by its serialized arguments
#[derive(Debug, Default)]
pub struct NormalizationCache {
    entry: Option<(Vec<u8>, Arc<TaskTable>)>,
    hits: u64,
    misses: u64,
}

#[derive(Serialize)]
struct CacheKey<'a> {
    provider: ProviderKind,
    containers: &'a [Container],
    tasks: &'a [RawTask],
    today: NaiveDate,
}

impl NormalizationCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the normalized table for these inputs, computing it only if the inputs changed since the last call
    pub fn get_or_normalize(&mut self, provider: ProviderKind, containers: &[Container], tasks: &[RawTask], today: NaiveDate) -> Result<Arc<TaskTable>, Error> {
        let key = serde_json::to_vec(&CacheKey { provider, containers, tasks, today })?;

        if let Some((cached_key, table)) = &self.entry {
            if *cached_key == key {
                self.hits += 1;
                log::debug!("Normalized table served from the cache");
                return Ok(Arc::clone(table));
            }
        }

        self.misses += 1;
        let table = Arc::new(normalize_all(provider, containers, tasks, today)?);
        self.entry = Some((key, Arc::clone(&table)));
        Ok(table)
    }

    pub fn hits(&self) -> u64   { self.hits   }
    pub fn misses(&self) -> u64 { self.misses }

    pub fn clear(&mut self) {
        self.entry = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::todoist::types::TodoistTask;

    fn todoist_task(id: &str, content: &str) -> RawTask {
        RawTask::Todoist(TodoistTask {
            id: id.to_string(),
            project_id: "p1".to_string(),
            content: content.to_string(),
            description: String::new(),
            is_completed: false,
            priority: 1,
            due: None,
            created_at: None,
            completed_at: None,
        })
    }

    #[test]
    fn same_inputs_are_served_from_the_cache() {
        let containers = vec![Container::new("p1", "Inbox")];
        let tasks = vec![todoist_task("1", "Buy milk")];
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();

        let mut cache = NormalizationCache::new();
        let first = cache.get_or_normalize(ProviderKind::Todoist, &containers, &tasks, today).unwrap();
        let second = cache.get_or_normalize(ProviderKind::Todoist, &containers, &tasks, today).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!((cache.hits(), cache.misses()), (1, 1));
    }

    #[test]
    fn changed_inputs_are_normalized_again() {
        let containers = vec![Container::new("p1", "Inbox")];
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();

        let mut cache = NormalizationCache::new();
        cache.get_or_normalize(ProviderKind::Todoist, &containers, &[todoist_task("1", "Buy milk")], today).unwrap();
        let table = cache.get_or_normalize(ProviderKind::Todoist, &containers, &[todoist_task("1", "Buy bread")], today).unwrap();
        assert_eq!(table.tasks()[0].title(), "Buy bread");

        // Statuses depend on the current date, so a new day is a new entry
        cache.get_or_normalize(ProviderKind::Todoist, &containers, &[todoist_task("1", "Buy bread")], today.succ_opt().unwrap()).unwrap();
        assert_eq!((cache.hits(), cache.misses()), (0, 3));
    }

    #[test]
    fn entry_is_only_reused_for_identical_inputs() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let tasks = vec![todoist_task("1", "Buy milk")];
        let inbox = vec![Container::new("p1", "Inbox")];
        let work = vec![Container::new("p1", "Works")];

        let mut cache = NormalizationCache::new();
        let first = cache.get_or_normalize(ProviderKind::Todoist, &inbox, &tasks, today).unwrap();
        let second = cache.get_or_normalize(ProviderKind::Todoist, &work, &tasks, today).unwrap();
        assert!(Arc::ptr_eq(&first, &second) == false);
        assert_eq!(second.tasks()[0].grouping_name(), "Works");

        let third = cache.get_or_normalize(ProviderKind::Todoist, &work, &tasks, today).unwrap();
        assert!(Arc::ptr_eq(&second, &third));
        assert_eq!((cache.hits(), cache.misses()), (1, 2));
    }
}
