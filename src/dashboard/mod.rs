//! Dashboards: what is computed from a normalized task table, and how it is rendered.
//!
//! Aggregate views (status, grouping and priority counts, completions over time, upcoming tasks)
//! always use the whole table. Only the detail table obeys the filters.

pub mod filter;
pub mod render;
pub mod views;

use serde::Serialize;

use crate::error::Error;
use crate::provider::{Features, ProviderKind};
use crate::task::TaskTable;

pub use filter::{FilterInput, FilterOptions, Filters, Selection};
pub use render::{render_json, TextRenderer};
pub use views::{Count, DailyCount, Row};


/// Everything a dashboard page shows
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DashboardView {
    pub provider: ProviderKind,
    pub title: String,
    pub filter_options: FilterOptions,
    pub status_counts: Vec<Count>,
    pub grouping_counts: Vec<Count>,
    /// Only for providers that have priorities
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority_counts: Option<Vec<Count>>,
    pub completions: Vec<DailyCount>,
    pub upcoming: Vec<Row>,
    pub tasks: Vec<Row>,
}

/// Compute every view of a dashboard
pub fn build_view(table: &TaskTable, input: &FilterInput) -> Result<DashboardView, Error> {
    let provider = table.provider();
    let filter_options = FilterOptions::from_table(table);
    let filters = Filters::select(&filter_options, input)?;
    let filtered = filters.apply(table);
    log::debug!("{} out of {} tasks match the filters", filtered.len(), table.len());

    let priority_counts = if provider.features().contains(Features::PRIORITY) {
        Some(views::priority_counts(table))
    } else {
        None
    };

    Ok(DashboardView {
        provider,
        title: provider.dashboard_title().to_string(),
        status_counts: views::status_counts(table),
        grouping_counts: views::grouping_counts(table),
        priority_counts,
        completions: views::completions_over_time(table),
        upcoming: views::upcoming(table).into_iter().map(Row::from).collect(),
        tasks: filtered.iter().map(Row::from).collect(),
        filter_options,
    })
}


#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use crate::container::ContainerId;
    use crate::task::{Extras, Status, Task};

    fn task(title: &str, grouping: &str, status: Status) -> Task {
        Task::new_with_parameters(
            title.to_string(), title.to_string(),
            ContainerId::from(grouping), grouping.to_string(),
            status, Some(NaiveDate::from_ymd_opt(2024, 7, 1).unwrap()), None,
            Extras::default(),
        )
    }

    #[test]
    fn aggregates_ignore_filters() {
        let table = TaskTable::new(ProviderKind::GoogleTasks, vec![
            task("a", "Work", Status::Active),
            task("b", "Home", Status::Active),
            task("c", "Home", Status::Overdue),
        ]);
        let input = FilterInput { grouping: Some("Work".into()), ..FilterInput::default() };
        let view = build_view(&table, &input).unwrap();

        assert_eq!(view.title, "Google Tasks Dashboard");
        assert_eq!(view.tasks.len(), 1);
        assert_eq!(view.tasks[0].title, "a");
        assert_eq!(view.grouping_counts, vec![Count::new("Home", 2), Count::new("Work", 1)]);
        assert_eq!(view.upcoming.len(), 2);
        assert_eq!(view.priority_counts, None);
    }

    #[test]
    fn invalid_filters_abort() {
        let table = TaskTable::new(ProviderKind::Todoist, vec![task("a", "Work", Status::Active)]);
        let input = FilterInput { status: Some("Whatever".into()), ..FilterInput::default() };
        assert!(matches!(build_view(&table, &input), Err(Error::InvalidSelection { .. })));
    }
}
