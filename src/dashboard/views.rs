//! The views of a dashboard. Each one is computed independently from a task table

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use serde::Serialize;

use crate::task::{Priority, Status, Task, TaskTable};

/// How many tasks the "Upcoming Tasks" view shows at most
pub const UPCOMING_LIMIT: usize = 10;


/// A labelled count, e.g. one bar of a bar chart
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Count {
    pub label: String,
    pub count: usize,
}

impl Count {
    pub fn new<S: ToString>(label: S, count: usize) -> Self {
        Self { label: label.to_string(), count }
    }
}

/// How many tasks were completed on a given day
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub count: usize,
}


/// One row of a task table, as displayed
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Row {
    pub title: String,
    pub grouping: String,
    pub status: Status,
    pub due_date: Option<NaiveDate>,
    pub completed_date: Option<NaiveDate>,
    pub priority: Option<String>,
}

impl From<&Task> for Row {
    fn from(task: &Task) -> Self {
        Self {
            title: task.title().to_string(),
            grouping: task.grouping_name().to_string(),
            status: task.status(),
            due_date: task.due_date(),
            completed_date: task.completed_date(),
            priority: task.priority().and_then(|p| p.label()).map(String::from),
        }
    }
}


/// Count values, most frequent first (ties are sorted by label, so that the output is stable)
fn value_counts<'a, I: Iterator<Item = &'a str>>(values: I) -> Vec<Count> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for value in values {
        *counts.entry(value).or_insert(0) += 1;
    }

    let mut counts: Vec<Count> = counts.into_iter()
        .map(|(label, count)| Count::new(label, count))
        .collect();
    counts.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));
    counts
}

pub fn status_counts(table: &TaskTable) -> Vec<Count> {
    value_counts(table.iter().map(|t| t.status().as_str()))
}

pub fn grouping_counts(table: &TaskTable) -> Vec<Count> {
    value_counts(table.iter().map(|t| t.grouping_name()))
}

/// Tasks per priority label, from the highest priority to the lowest.
/// Labels no task has are omitted.
pub fn priority_counts(table: &TaskTable) -> Vec<Count> {
    let labels = table.iter()
        .filter_map(|t| t.priority().and_then(|p| p.label()));
    let counts = value_counts(labels);

    Priority::LABELS.iter()
        .filter_map(|label| counts.iter().find(|c| c.label == *label).cloned())
        .collect()
}

/// Completed tasks per completion date, oldest first
pub fn completions_over_time(table: &TaskTable) -> Vec<DailyCount> {
    let mut per_day: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for date in table.iter().filter_map(|t| t.completed_date()) {
        *per_day.entry(date).or_insert(0) += 1;
    }
    per_day.into_iter()
        .map(|(date, count)| DailyCount { date, count })
        .collect()
}

/// Active tasks with a due date, soonest first
pub fn upcoming(table: &TaskTable) -> Vec<&Task> {
    let mut tasks: Vec<&Task> = table.iter()
        .filter(|t| t.status() == Status::Active && t.due_date().is_some())
        .collect();
    // `sort_by_key` is stable: tasks due the same day stay in fetch order
    tasks.sort_by_key(|t| t.due_date());
    tasks.truncate(UPCOMING_LIMIT);
    tasks
}
