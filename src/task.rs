//! Normalized tasks: the common shape every provider's records are mapped into

use std::fmt::{Display, Formatter};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::container::{Container, ContainerId, NameLookup};
use crate::error::Error;
use crate::item::RawTask;
use crate::provider::ProviderKind;
use crate::utils::optional_date_part;

/// The derived state of a task.
///
/// This is never stored by a provider: it is recomputed from the completion marker,
/// the due date and the current date every time tasks are normalized.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    Completed,
    Overdue,
    Active,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Completed => "Completed",
            Status::Overdue => "Overdue",
            Status::Active => "Active",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Completed" => Some(Status::Completed),
            "Overdue" => Some(Status::Overdue),
            "Active" => Some(Status::Active),
            _ => None,
        }
    }
}

impl Display for Status {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Classify a task.
///
/// Completion wins over everything else. Otherwise a task is overdue only when it has a due date
/// strictly before `today`.
pub fn classify(completed: bool, due_date: Option<NaiveDate>, today: NaiveDate) -> Status {
    if completed {
        return Status::Completed;
    }
    match due_date {
        Some(due) if due < today => Status::Overdue,
        _ => Status::Active,
    }
}


/// A Todoist priority, from 1 (normal) to 4 (urgent).
///
/// Todoist clients display them the other way round: API priority 4 is shown as "p1".
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Priority(u8);

impl Priority {
    /// Display labels, from the most to the least urgent
    pub const LABELS: [&'static str; 4] = ["1 (Highest)", "2 (High)", "3 (Medium)", "4 (Low)"];

    pub fn new(value: u8) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u8 {
        self.0
    }

    /// The display label, or `None` for values Todoist does not define
    pub fn label(&self) -> Option<&'static str> {
        match self.0 {
            4 => Some(Self::LABELS[0]),
            3 => Some(Self::LABELS[1]),
            2 => Some(Self::LABELS[2]),
            1 => Some(Self::LABELS[3]),
            _ => None,
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::LABELS.iter()
            .position(|l| *l == label)
            .map(|index| Self(4 - index as u8))
    }
}


/// Provider-specific fields, carried through without interpretation
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Extras {
    /// Google Tasks `notes` or Todoist `description`
    pub notes: String,
    /// Todoist only
    pub priority: Option<Priority>,
    /// Google Tasks `updated` or Todoist `created_at`, as sent by the provider
    pub created: String,
}


/// A normalized task: one row of a dashboard
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Task {
    task_id: String,
    title: String,
    grouping_id: ContainerId,
    grouping_name: String,
    status: Status,
    due_date: Option<NaiveDate>,
    completed_date: Option<NaiveDate>,
    extras: Extras,
}

impl Task {
    pub fn new_with_parameters(task_id: String, title: String,
                               grouping_id: ContainerId, grouping_name: String,
                               status: Status, due_date: Option<NaiveDate>, completed_date: Option<NaiveDate>,
                               extras: Extras,
                            ) -> Self
    {
        Self { task_id, title, grouping_id, grouping_name, status, due_date, completed_date, extras }
    }

    pub fn task_id(&self) -> &str                  { &self.task_id        }
    pub fn title(&self) -> &str                    { &self.title          }
    pub fn grouping_id(&self) -> &ContainerId      { &self.grouping_id    }
    pub fn grouping_name(&self) -> &str            { &self.grouping_name  }
    pub fn status(&self) -> Status                 { self.status          }
    pub fn due_date(&self) -> Option<NaiveDate>    { self.due_date        }
    pub fn completed_date(&self) -> Option<NaiveDate> { self.completed_date }
    pub fn extras(&self) -> &Extras                { &self.extras         }
    pub fn priority(&self) -> Option<Priority>     { self.extras.priority }
}


/// Map a raw provider record into a [`Task`].
///
/// Returns `Ok(None)` for records that are not displayed at all: Google Tasks records without a title
/// (this happens with deleted tasks). Todoist tasks are always kept, even with an empty content.
pub fn normalize(raw: &RawTask, lookup: &NameLookup, today: NaiveDate) -> Result<Option<Task>, Error> {
    let grouping_id = raw.container_id();
    let grouping_name = lookup.resolve(&grouping_id).to_string();

    let (title, completed, due_date, completed_date, extras) = match raw {
        RawTask::GoogleTasks { task, .. } => {
            let title = match &task.title {
                None => {
                    log::trace!("Ignoring untitled task {}", task.id);
                    return Ok(None);
                },
                Some(title) => title.clone(),
            };
            let completed = task.completed.as_deref().map(|c| c.is_empty() == false).unwrap_or(false);
            let extras = Extras {
                notes: task.notes.clone().unwrap_or_default(),
                priority: None,
                created: task.updated.clone().unwrap_or_default(),
            };
            (title, completed, optional_date_part(task.due.as_deref())?, optional_date_part(task.completed.as_deref())?, extras)
        },

        RawTask::Todoist(task) => {
            let completed_at = task.completed_at.as_deref().filter(|c| c.is_empty() == false);
            let completed = task.is_completed || completed_at.is_some();
            let due = task.due.as_ref().map(|due| due.date.as_str());
            let extras = Extras {
                notes: task.description.clone(),
                priority: Some(Priority::new(task.priority)),
                created: task.created_at.clone().unwrap_or_default(),
            };
            (task.content.clone(), completed, optional_date_part(due)?, optional_date_part(completed_at)?, extras)
        },
    };

    let status = classify(completed, due_date, today);
    Ok(Some(Task {
        task_id: raw.id().to_string(),
        title,
        grouping_id,
        grouping_name,
        status,
        due_date,
        completed_date,
        extras,
    }))
}

/// Normalize every fetched record, in fetch order
pub fn normalize_all(provider: ProviderKind, containers: &[Container], raw_tasks: &[RawTask], today: NaiveDate) -> Result<TaskTable, Error> {
    let lookup = NameLookup::new(containers);

    let mut tasks = Vec::with_capacity(raw_tasks.len());
    for raw in raw_tasks {
        if let Some(task) = normalize(raw, &lookup, today)? {
            tasks.push(task);
        }
    }
    log::debug!("Normalized {} out of {} {} records", tasks.len(), raw_tasks.len(), provider);

    Ok(TaskTable::new(provider, tasks))
}


/// The normalized tasks of a provider, in fetch order
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TaskTable {
    provider: ProviderKind,
    tasks: Vec<Task>,
}

impl TaskTable {
    pub fn new(provider: ProviderKind, tasks: Vec<Task>) -> Self {
        Self { provider, tasks }
    }

    pub fn provider(&self) -> ProviderKind { self.provider }
    pub fn tasks(&self) -> &[Task]         { &self.tasks   }
    pub fn len(&self) -> usize             { self.tasks.len() }
    pub fn is_empty(&self) -> bool         { self.tasks.is_empty() }

    pub fn iter(&self) -> std::slice::Iter<'_, Task> {
        self.tasks.iter()
    }

    /// A new table, with only the tasks that match `predicate`
    pub fn filtered<P>(&self, mut predicate: P) -> Self
    where
        P: FnMut(&Task) -> bool,
    {
        let tasks = self.tasks.iter()
            .filter(|t| predicate(t))
            .cloned()
            .collect();
        Self { provider: self.provider, tasks }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    use crate::google::types::GoogleTask;
    use crate::todoist::types::{TodoistDue, TodoistTask};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn google(list: &str, task: GoogleTask) -> RawTask {
        RawTask::GoogleTasks { list_id: ContainerId::from(list), task }
    }

    fn todoist(id: &str, project: &str) -> TodoistTask {
        TodoistTask {
            id: id.to_string(),
            project_id: project.to_string(),
            content: format!("Task {}", id),
            description: String::new(),
            is_completed: false,
            priority: 1,
            due: None,
            created_at: None,
            completed_at: None,
        }
    }

    #[test]
    fn completion_wins_over_due_date() {
        let today = date(2024, 6, 1);
        assert_eq!(classify(true, Some(date(2020, 1, 1)), today), Status::Completed);
        assert_eq!(classify(true, None, today), Status::Completed);
        assert_eq!(classify(true, Some(date(2030, 1, 1)), today), Status::Completed);
    }

    #[test]
    fn overdue_depends_on_today() {
        let due = Some(date(2023, 1, 1));
        assert_eq!(classify(false, due, date(2024, 6, 1)), Status::Overdue);
        assert_eq!(classify(false, due, date(2022, 12, 31)), Status::Active);
        // Due today is not overdue yet
        assert_eq!(classify(false, due, date(2023, 1, 1)), Status::Active);
    }

    #[test]
    fn no_due_date_is_never_overdue() {
        assert_eq!(classify(false, None, date(2024, 6, 1)), Status::Active);
    }

    #[test]
    fn priority_labels() {
        assert_eq!(Priority::new(4).label(), Some("1 (Highest)"));
        assert_eq!(Priority::new(1).label(), Some("4 (Low)"));
        assert_eq!(Priority::new(0).label(), None);
        assert_eq!(Priority::from_label("2 (High)"), Some(Priority::new(3)));
        assert_eq!(Priority::from_label("All"), None);
    }

    #[test]
    fn scenario_completed_and_overdue() {
        let today = date(2024, 6, 1);
        let lookup = NameLookup::new(&[Container::new("list", "Chores")]);

        let task_a = google("list", GoogleTask {
            id: "a".into(),
            title: Some("Task A".into()),
            completed: Some("2024-01-01T00:00:00Z".into()),
            ..GoogleTask::default()
        });
        let task_b = google("list", GoogleTask {
            id: "b".into(),
            title: Some("Task B".into()),
            due: Some("2023-01-01".into()),
            ..GoogleTask::default()
        });

        let a = normalize(&task_a, &lookup, today).unwrap().unwrap();
        let b = normalize(&task_b, &lookup, today).unwrap().unwrap();
        assert_eq!(a.status(), Status::Completed);
        assert_eq!(a.completed_date(), Some(date(2024, 1, 1)));
        assert_eq!(b.status(), Status::Overdue);
        assert_eq!(b.grouping_name(), "Chores");

        let mut todoist_a = todoist("a", "p");
        todoist_a.completed_at = Some("2024-01-01T00:00:00Z".into());
        let a = normalize(&RawTask::Todoist(todoist_a), &lookup, today).unwrap().unwrap();
        assert_eq!(a.status(), Status::Completed);
    }

    #[test]
    fn untitled_google_tasks_are_dropped() {
        let lookup = NameLookup::default();
        let untitled = google("list", GoogleTask { id: "x".into(), ..GoogleTask::default() });
        assert_eq!(normalize(&untitled, &lookup, date(2024, 1, 1)).unwrap(), None);

        let empty_title = google("list", GoogleTask { id: "y".into(), title: Some(String::new()), ..GoogleTask::default() });
        assert!(normalize(&empty_title, &lookup, date(2024, 1, 1)).unwrap().is_some());
    }

    #[test]
    fn empty_todoist_tasks_are_kept() {
        let mut task = todoist("1", "p");
        task.content = String::new();
        let normalized = normalize(&RawTask::Todoist(task), &NameLookup::default(), date(2024, 1, 1)).unwrap().unwrap();
        assert_eq!(normalized.title(), "");
        assert_eq!(normalized.grouping_name(), "Unknown");
    }

    #[test]
    fn todoist_fields_are_carried() {
        let mut task = todoist("1", "p");
        task.priority = 4;
        task.description = "Some details".into();
        task.created_at = Some("2024-01-02T10:00:00Z".into());
        task.due = Some(TodoistDue {
            date: "2024-05-31T18:00:00".into(),
            string: None,
            datetime: None,
            is_recurring: false,
        });

        let lookup = NameLookup::new(&[Container::new("p", "Work")]);
        let normalized = normalize(&RawTask::Todoist(task), &lookup, date(2024, 6, 1)).unwrap().unwrap();
        assert_eq!(normalized.status(), Status::Overdue);
        assert_eq!(normalized.due_date(), Some(date(2024, 5, 31)));
        assert_eq!(normalized.priority(), Some(Priority::new(4)));
        assert_eq!(normalized.extras().notes, "Some details");
        assert_eq!(normalized.extras().created, "2024-01-02T10:00:00Z");
    }

    #[test]
    fn malformed_due_date_aborts() {
        let task = google("list", GoogleTask {
            id: "x".into(),
            title: Some("x".into()),
            due: Some("someday".into()),
            ..GoogleTask::default()
        });
        assert!(matches!(normalize(&task, &NameLookup::default(), date(2024, 1, 1)), Err(Error::InvalidData(_))));
    }

    #[test]
    fn normalize_all_keeps_fetch_order() {
        let containers = vec![Container::new("p", "Work")];
        let raw: Vec<RawTask> = vec![todoist("2", "p"), todoist("1", "q")].into_iter().map(RawTask::Todoist).collect();

        let table = normalize_all(ProviderKind::Todoist, &containers, &raw, date(2024, 1, 1)).unwrap();
        let ids: Vec<&str> = table.iter().map(|t| t.task_id()).collect();
        assert_eq!(ids, vec!["2", "1"]);
        assert_eq!(table.tasks()[1].grouping_name(), "Unknown");
    }
}
