//! Renders a dashboard as terminal text, or as JSON

use std::fmt::Write;

use csscolorparser::Color;
use once_cell::sync::Lazy;
use owo_colors::OwoColorize;

use crate::dashboard::views::{Count, Row};
use crate::dashboard::DashboardView;
use crate::error::Error;
use crate::provider::Features;
use crate::utils::truncate;

pub const NO_COMPLETION_DATA: &str = "No completion data available";
pub const NO_UPCOMING_TASKS: &str = "No upcoming tasks with due dates";
pub const NO_MATCHING_TASKS: &str = "No tasks match the selected filters";

const BAR_WIDTH: usize = 40;
const TITLE_WIDTH: usize = 48;

static SET3: Lazy<Vec<Color>> = Lazy::new(|| palette(&[
    "rgb(141,211,199)", "rgb(255,255,179)", "rgb(190,186,218)", "rgb(251,128,114)",
    "rgb(128,177,211)", "rgb(253,180,98)", "rgb(179,222,105)", "rgb(252,205,229)",
    "rgb(217,217,217)", "rgb(188,128,189)", "rgb(204,235,197)", "rgb(255,237,111)",
]));

static PASTEL: Lazy<Vec<Color>> = Lazy::new(|| palette(&[
    "rgb(102,197,204)", "rgb(246,207,113)", "rgb(248,156,116)", "rgb(220,176,242)",
    "rgb(135,197,95)", "rgb(158,185,243)", "rgb(254,136,177)", "rgb(201,219,116)",
    "rgb(139,224,164)", "rgb(180,151,231)", "rgb(179,179,179)",
]));

static RDBU: Lazy<Vec<Color>> = Lazy::new(|| palette(&[
    "rgb(103,0,31)", "rgb(178,24,43)", "rgb(214,96,77)", "rgb(244,165,130)",
    "rgb(253,219,199)", "rgb(247,247,247)", "rgb(209,229,240)", "rgb(146,197,222)",
    "rgb(67,147,195)", "rgb(33,102,172)", "rgb(5,48,97)",
]));

fn palette(colors: &[&str]) -> Vec<Color> {
    colors.iter()
        .filter_map(|c| match csscolorparser::parse(c) {
            Ok(color) => Some(color),
            Err(err) => {
                log::warn!("Ignoring invalid palette color {}: {}", c, err);
                None
            }
        })
        .collect()
}


/// Renders dashboards for a terminal
#[derive(Clone, Debug)]
pub struct TextRenderer {
    color: bool,
}

impl TextRenderer {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    pub fn render(&self, view: &DashboardView) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail
        let _ = self.write_dashboard(&mut out, view);
        out
    }

    fn write_dashboard(&self, out: &mut String, view: &DashboardView) -> std::fmt::Result {
        let provider = view.provider;
        let has_priorities = provider.features().contains(Features::PRIORITY);

        writeln!(out, "{}", self.title(&view.title))?;
        writeln!(out)?;

        writeln!(out, "{}", self.header("Filters"))?;
        writeln!(out, "  {}: {}", provider.grouping_select_label(), view.filter_options.grouping.join(" | "))?;
        writeln!(out, "  Select Status: {}", view.filter_options.status.join(" | "))?;
        if let Some(priorities) = &view.filter_options.priority {
            writeln!(out, "  Select Priority: {}", priorities.join(" | "))?;
        }
        writeln!(out)?;

        writeln!(out, "{}", self.header(provider.status_subheader()))?;
        self.write_bars(out, provider.status_chart_title(), &view.status_counts, &SET3)?;

        writeln!(out, "{}", self.header(provider.grouping_subheader()))?;
        self.write_bars(out, provider.grouping_chart_title(), &view.grouping_counts, &PASTEL)?;

        if let Some(priority_counts) = &view.priority_counts {
            writeln!(out, "{}", self.header("Tasks by priority"))?;
            self.write_bars(out, "Tasks by Priority", priority_counts, &RDBU)?;
        }

        writeln!(out, "{}", self.header("Task Completion Over Time"))?;
        if view.completions.is_empty() {
            writeln!(out, "{}", NO_COMPLETION_DATA)?;
            writeln!(out)?;
        } else {
            let per_day: Vec<Count> = view.completions.iter()
                .map(|d| Count::new(d.date.format("%Y-%m-%d"), d.count))
                .collect();
            self.write_bars(out, "Tasks Completed Over Time", &per_day, &[])?;
        }

        writeln!(out, "{}", self.header("Upcoming Tasks"))?;
        if view.upcoming.is_empty() {
            writeln!(out, "{}", NO_UPCOMING_TASKS)?;
        } else {
            let mut headers = vec!["Title", provider.grouping_label(), "Due date"];
            if has_priorities {
                headers.push("Priority");
            }
            let rows: Vec<Vec<String>> = view.upcoming.iter()
                .map(|row| {
                    let mut cells = vec![truncate(&row.title, TITLE_WIDTH), row.grouping.clone(), date_cell(row.due_date)];
                    if has_priorities {
                        cells.push(priority_cell(row));
                    }
                    cells
                })
                .collect();
            write_table(out, &headers, &rows)?;
        }
        writeln!(out)?;

        writeln!(out, "{}", self.header("Task List"))?;
        if view.tasks.is_empty() {
            writeln!(out, "{}", NO_MATCHING_TASKS)?;
        } else {
            let show_completed = provider.features().contains(Features::COMPLETED_COLUMN);
            let mut headers = vec!["Title", provider.grouping_label(), "Status", "Due date"];
            if show_completed {
                headers.push("Completed");
            }
            if has_priorities {
                headers.push("Priority");
            }
            let rows: Vec<Vec<String>> = view.tasks.iter()
                .map(|row| {
                    let mut cells = vec![
                        truncate(&row.title, TITLE_WIDTH),
                        row.grouping.clone(),
                        row.status.to_string(),
                        date_cell(row.due_date),
                    ];
                    if show_completed {
                        cells.push(date_cell(row.completed_date));
                    }
                    if has_priorities {
                        cells.push(priority_cell(row));
                    }
                    cells
                })
                .collect();
            write_table(out, &headers, &rows)?;
        }

        Ok(())
    }

    fn title(&self, text: &str) -> String {
        if self.color {
            text.bold().underline().to_string()
        } else {
            format!("{}\n{}", text, "=".repeat(text.chars().count()))
        }
    }

    fn header(&self, text: &str) -> String {
        if self.color {
            text.bold().to_string()
        } else {
            format!("{}\n{}", text, "-".repeat(text.chars().count()))
        }
    }

    /// A horizontal bar chart. Colors cycle through the palette, an empty palette means no color
    fn write_bars(&self, out: &mut String, title: &str, counts: &[Count], palette: &[Color]) -> std::fmt::Result {
        writeln!(out, "{}", title)?;
        let label_width = counts.iter().map(|c| c.label.chars().count()).max().unwrap_or(0);
        let max_count = counts.iter().map(|c| c.count).max().unwrap_or(0);

        for (index, count) in counts.iter().enumerate() {
            let length = bar_length(count.count, max_count);
            let bar = "█".repeat(length);
            let bar = match (self.color, palette.is_empty()) {
                (true, false) => paint(&bar, &palette[index % palette.len()]),
                _ => bar,
            };
            writeln!(out, "  {:<width$}  {} {}", count.label, bar, count.count, width = label_width)?;
        }
        writeln!(out)
    }
}

fn bar_length(count: usize, max_count: usize) -> usize {
    if max_count == 0 || count == 0 {
        return 0;
    }
    std::cmp::max(1, count * BAR_WIDTH / max_count)
}

fn paint(text: &str, color: &Color) -> String {
    let (r, g, b, _) = color.rgba_u8();
    text.truecolor(r, g, b).to_string()
}

fn date_cell(date: Option<chrono::NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default()
}

fn priority_cell(row: &Row) -> String {
    row.priority.clone().unwrap_or_default()
}

fn write_table(out: &mut String, headers: &[&str], rows: &[Vec<String>]) -> std::fmt::Result {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = std::cmp::max(*width, cell.chars().count());
        }
    }

    let header_cells: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
    write_table_line(out, &header_cells, &widths)?;
    let separator: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    write_table_line(out, &separator, &widths)?;
    for row in rows {
        write_table_line(out, row, &widths)?;
    }
    Ok(())
}

fn write_table_line(out: &mut String, cells: &[String], widths: &[usize]) -> std::fmt::Result {
    let padded: Vec<String> = cells.iter().zip(widths)
        .map(|(cell, width)| pad(cell, *width))
        .collect();
    writeln!(out, "{}", padded.join("  ").trim_end())
}

/// Pad with spaces, up to `width` chars
fn pad(cell: &str, width: usize) -> String {
    let len = cell.chars().count();
    let mut padded = cell.to_string();
    padded.extend(std::iter::repeat(' ').take(width.saturating_sub(len)));
    padded
}


/// The view model as pretty-printed JSON
pub fn render_json(view: &DashboardView) -> Result<String, Error> {
    Ok(serde_json::to_string_pretty(view)?)
}
