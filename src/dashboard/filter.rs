//! Sidebar-like filters of the detail table

use serde::Serialize;

use crate::error::Error;
use crate::provider::Features;
use crate::task::{Priority, Status, Task, TaskTable};

/// The option that disables a filter
pub const ALL: &str = "All";


/// What a single filter lets through
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Selection<T> {
    All,
    Only(T),
}

impl<T: PartialEq> Selection<T> {
    pub fn accepts(&self, value: &T) -> bool {
        match self {
            Selection::All => true,
            Selection::Only(expected) => expected == value,
        }
    }
}

impl<T> Default for Selection<T> {
    fn default() -> Self {
        Selection::All
    }
}


/// The options offered for every filter, "All" first
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FilterOptions {
    pub grouping: Vec<String>,
    pub status: Vec<String>,
    /// Only for providers that have priorities
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Vec<String>>,
}

impl FilterOptions {
    pub fn from_table(table: &TaskTable) -> Self {
        let grouping = with_all(table.iter().map(|t| t.grouping_name().to_string()));
        let status = with_all(table.iter().map(|t| t.status().as_str().to_string()));

        let priority = if table.provider().features().contains(Features::PRIORITY) {
            let mut options = vec![ALL.to_string()];
            options.extend(Priority::LABELS.iter().map(|l| l.to_string()));
            Some(options)
        } else {
            None
        };

        Self { grouping, status, priority }
    }
}

/// "All", then the sorted unique values
fn with_all<I: Iterator<Item = String>>(values: I) -> Vec<String> {
    let mut values: Vec<String> = values.collect();
    values.sort();
    values.dedup();
    values.insert(0, ALL.to_string());
    values
}


/// What the user asked for. `None` means "All"
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FilterInput {
    pub grouping: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
}


/// Validated filters, that compose with a logical AND
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Filters {
    grouping: Selection<String>,
    status: Selection<Status>,
    priority: Selection<Priority>,
}

impl Filters {
    /// Check the user input against the offered options
    pub fn select(options: &FilterOptions, input: &FilterInput) -> Result<Self, Error> {
        let grouping = match pick("grouping", &options.grouping, input.grouping.as_deref())? {
            None => Selection::All,
            Some(index) => Selection::Only(options.grouping[index].clone()),
        };

        let status = match pick("status", &options.status, input.status.as_deref())? {
            None => Selection::All,
            Some(index) => match Status::from_name(&options.status[index]) {
                Some(status) => Selection::Only(status),
                None => return Err(Error::InvalidData(format!("Unexpected status option {}", options.status[index]))),
            },
        };

        let priority = match &options.priority {
            None => match input.priority.as_deref() {
                None => Selection::All,
                Some(value) if value == ALL => Selection::All,
                Some(value) => return Err(Error::InvalidSelection {
                    filter: "priority".to_string(),
                    value: value.to_string(),
                    options: ALL.to_string(),
                }),
            },
            Some(priority_options) => match pick("priority", priority_options, input.priority.as_deref())? {
                None => Selection::All,
                // "1 (Highest)" is the second option, and Todoist priority 4
                Some(index) => Selection::Only(Priority::new(5 - index as u8)),
            },
        };

        Ok(Self { grouping, status, priority })
    }

    pub fn grouping(&self) -> &Selection<String>   { &self.grouping }
    pub fn status(&self) -> &Selection<Status>     { &self.status   }
    pub fn priority(&self) -> &Selection<Priority> { &self.priority }

    pub fn is_all(&self) -> bool {
        self.grouping == Selection::All && self.status == Selection::All && self.priority == Selection::All
    }

    pub fn matches(&self, task: &Task) -> bool {
        let grouping_ok = match &self.grouping {
            Selection::All => true,
            Selection::Only(name) => name == task.grouping_name(),
        };
        grouping_ok
            && self.status.accepts(&task.status())
            && match &self.priority {
                Selection::All => true,
                Selection::Only(expected) => task.priority() == Some(*expected),
            }
    }

    pub fn apply(&self, table: &TaskTable) -> TaskTable {
        table.filtered(|task| self.matches(task))
    }
}

/// The index of the selected option, or `None` for "All"
fn pick(filter: &str, options: &[String], value: Option<&str>) -> Result<Option<usize>, Error> {
    let value = match value {
        None => return Ok(None),
        Some(v) => v,
    };

    match options.iter().position(|option| option == value) {
        Some(0) => Ok(None),
        Some(index) => Ok(Some(index)),
        None => Err(Error::InvalidSelection {
            filter: filter.to_string(),
            value: value.to_string(),
            options: options.join(", "),
        }),
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::ContainerId;
    use crate::provider::ProviderKind;
    use crate::task::Extras;

    fn task(title: &str, grouping: &str, status: Status, priority: Option<u8>) -> Task {
        Task::new_with_parameters(
            title.to_string(), title.to_string(),
            ContainerId::from(grouping), grouping.to_string(),
            status, None, None,
            Extras { priority: priority.map(Priority::new), ..Extras::default() },
        )
    }

    fn todoist_table() -> TaskTable {
        TaskTable::new(ProviderKind::Todoist, vec![
            task("a", "Work", Status::Active, Some(4)),
            task("b", "Home", Status::Overdue, Some(1)),
            task("c", "Work", Status::Completed, Some(4)),
            task("d", "Work", Status::Active, Some(2)),
        ])
    }

    fn titles(table: &TaskTable) -> Vec<&str> {
        table.iter().map(|t| t.title()).collect()
    }

    #[test]
    fn options_are_sorted_and_unique() {
        let options = FilterOptions::from_table(&todoist_table());
        assert_eq!(options.grouping, vec!["All", "Home", "Work"]);
        assert_eq!(options.status, vec!["All", "Active", "Completed", "Overdue"]);
        assert_eq!(options.priority.unwrap(), vec!["All", "1 (Highest)", "2 (High)", "3 (Medium)", "4 (Low)"]);

        let google = TaskTable::new(ProviderKind::GoogleTasks, vec![task("a", "Inbox", Status::Active, None)]);
        assert_eq!(FilterOptions::from_table(&google).priority, None);
    }

    #[test]
    fn all_selects_everything() {
        let table = todoist_table();
        let options = FilterOptions::from_table(&table);
        let filters = Filters::select(&options, &FilterInput {
            grouping: Some("All".into()), status: None, priority: Some("All".into()),
        }).unwrap();
        assert!(filters.is_all());
        assert_eq!(filters.apply(&table), table);
    }

    #[test]
    fn filters_compose() {
        let table = todoist_table();
        let options = FilterOptions::from_table(&table);

        let filters = Filters::select(&options, &FilterInput {
            grouping: Some("Work".into()), status: Some("Active".into()), priority: None,
        }).unwrap();
        assert_eq!(titles(&filters.apply(&table)), vec!["a", "d"]);

        let filters = Filters::select(&options, &FilterInput {
            grouping: Some("Work".into()), status: Some("Active".into()), priority: Some("1 (Highest)".into()),
        }).unwrap();
        assert_eq!(filters.priority(), &Selection::Only(Priority::new(4)));
        assert_eq!(titles(&filters.apply(&table)), vec!["a"]);

        let filters = Filters::select(&options, &FilterInput {
            priority: Some("4 (Low)".into()), ..FilterInput::default()
        }).unwrap();
        assert_eq!(titles(&filters.apply(&table)), vec!["b"]);
    }

    #[test]
    fn unknown_options_are_rejected() {
        let table = todoist_table();
        let options = FilterOptions::from_table(&table);

        let outcome = Filters::select(&options, &FilterInput { grouping: Some("Garden".into()), ..FilterInput::default() });
        match outcome {
            Err(Error::InvalidSelection { filter, value, options }) => {
                assert_eq!(filter, "grouping");
                assert_eq!(value, "Garden");
                assert_eq!(options, "All, Home, Work");
            },
            other => panic!("unexpected outcome {:?}", other),
        }

        let google = TaskTable::new(ProviderKind::GoogleTasks, vec![task("a", "Inbox", Status::Active, None)]);
        let google_options = FilterOptions::from_table(&google);
        let outcome = Filters::select(&google_options, &FilterInput { priority: Some("2 (High)".into()), ..FilterInput::default() });
        assert!(matches!(outcome, Err(Error::InvalidSelection { .. })));
    }

    #[test]
    fn statuses_that_never_occur_cannot_be_selected() {
        let table = TaskTable::new(ProviderKind::GoogleTasks, vec![task("a", "Inbox", Status::Active, None)]);
        let options = FilterOptions::from_table(&table);
        let outcome = Filters::select(&options, &FilterInput { status: Some("Overdue".into()), ..FilterInput::default() });
        assert!(matches!(outcome, Err(Error::InvalidSelection { .. })));
    }
}
