use std::error::Error;
use std::io::BufRead;
use std::path::PathBuf;

use clap::Parser;

use taskboard::config::Settings;
use taskboard::credentials::{NoPrompt, SecretStore, StdinPrompt, TokenPrompt};
use taskboard::page::{parse_query_args, OutputFormat, Page, PageArgs, PageOutcome, Session, PASSPHRASE_ARG};

/// Dashboards for your Google Tasks and Todoist tasks
#[derive(Parser, Debug)]
#[command(name = "taskboard", version, about, after_help = "Set RUST_LOG (e.g. RUST_LOG=debug) for more details.")]
struct Cli {
    /// Page to show: home, google or todoist
    #[arg(default_value = "home")]
    page: Page,

    /// Only show the tasks of this task list (or project) in the task table
    #[arg(long, visible_alias = "project", value_name = "NAME")]
    list: Option<String>,

    /// Only show tasks with this status (Active, Completed, Overdue)
    #[arg(long)]
    status: Option<String>,

    /// Only show tasks with this priority, e.g. "1 (Highest)" (Todoist only)
    #[arg(long, value_name = "LABEL")]
    priority: Option<String>,

    /// Passphrase, when dashboards require one
    #[arg(long)]
    passphrase: Option<String>,

    /// Page arguments, as in a URL query (e.g. "p=secret")
    #[arg(long)]
    query: Option<String>,

    /// Print the dashboard as JSON
    #[arg(long)]
    json: bool,

    /// Do not use ANSI colors
    #[arg(long)]
    no_color: bool,

    /// Keep the page open, and change filters on the go
    #[arg(long)]
    interactive: bool,

    /// Settings file (default: $TASKBOARD_CONFIG, or taskboard.json)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl Cli {
    /// The page arguments. `--passphrase` comes before any `p` of `--query`
    fn page_args(&self) -> PageArgs {
        let mut args = PageArgs::default();
        args.filters.grouping = self.list.clone();
        args.filters.status = self.status.clone();
        args.filters.priority = self.priority.clone();

        if let Some(passphrase) = &self.passphrase {
            args.query.entry(PASSPHRASE_ARG.to_string()).or_insert_with(Vec::new).push(passphrase.clone());
        }
        if let Some(query) = &self.query {
            for (key, values) in parse_query_args(query) {
                args.query.entry(key).or_insert_with(Vec::new).extend(values);
            }
        }
        if self.json {
            args.format = OutputFormat::Json;
        }
        args
    }
}

fn print_outcome(outcome: &PageOutcome) {
    match outcome {
        PageOutcome::Rendered(page) => print!("{}", page),
        PageOutcome::Warning(message) => eprintln!("Warning: {}", message),
        PageOutcome::Denied(page) => print!("{}", page),
        PageOutcome::Error(message) => eprintln!("{}", message),
    }
}

fn exit_code(outcome: &PageOutcome) -> i32 {
    if outcome.is_success() { 0 } else { 1 }
}

#[derive(Debug, PartialEq)]
enum FilterChange {
    Changed,
    Done,
    Invalid(String),
}

/// Applies a line such as `status=Overdue` or `list=All`
fn apply_filter_change(args: &mut PageArgs, line: &str) -> FilterChange {
    let line = line.trim();
    if line.is_empty() || line == "q" || line == "quit" {
        return FilterChange::Done;
    }

    let (key, value) = match line.split_once('=') {
        Some((k, v)) => (k.trim(), v.trim().to_string()),
        None => return FilterChange::Invalid("Expected <filter>=<value>".to_string()),
    };
    match key {
        "list" | "project" => args.filters.grouping = Some(value),
        "status" => args.filters.status = Some(value),
        "priority" => args.filters.priority = Some(value),
        other => return FilterChange::Invalid(format!("Unknown filter {}", other)),
    }
    FilterChange::Changed
}

/// Reads filter changes from stdin. Returns false when the user is done
fn read_filter_change(args: &mut PageArgs) -> Result<bool, Box<dyn Error>> {
    loop {
        eprint!("Change a filter (list=..., project=..., status=..., priority=...), or 'q' to quit: ");
        let mut line = String::new();
        if std::io::stdin().lock().read_line(&mut line)? == 0 {
            return Ok(false);
        }
        match apply_filter_change(args, &line) {
            FilterChange::Changed => return Ok(true),
            FilterChange::Done => return Ok(false),
            FilterChange::Invalid(message) => eprintln!("{}", message),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let cli = Cli::parse();
    let settings = match &cli.config {
        Some(path) => Settings::load_from(path)?,
        None => Settings::load()?,
    };
    let mut args = cli.page_args();
    args.color = settings.color && cli.no_color == false;
    let secrets = SecretStore::from_file(&settings.secrets_file)?;

    let page = cli.page;
    let mut session = Session::new(settings, secrets);
    let mut prompt: Box<dyn TokenPrompt> = if args.format == OutputFormat::Json {
        Box::new(NoPrompt)
    } else {
        Box::new(StdinPrompt)
    };

    loop {
        let outcome = session.run_page(page, &args, prompt.as_mut()).await;
        print_outcome(&outcome);

        if cli.interactive == false || page == Page::Home {
            let code = exit_code(&outcome);
            if code != 0 {
                std::process::exit(code);
            }
            return Ok(());
        }
        if read_filter_change(&mut args)? == false {
            log::debug!("Normalization cache: {} hits, {} misses", session.cache().hits(), session.cache().misses());
            return Ok(());
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn defaults_to_home() {
        let cli = Cli::try_parse_from(["taskboard"]).unwrap();
        assert_eq!(cli.page, Page::Home);
        assert_eq!(cli.page_args(), PageArgs::default());
    }

    #[test]
    fn filters_and_format() {
        let cli = Cli::try_parse_from([
            "taskboard", "todoist", "--project", "Work", "--status", "Overdue",
            "--priority", "1 (Highest)", "--json", "--no-color",
        ]).unwrap();
        assert_eq!(cli.page, Page::Todoist);
        assert!(cli.no_color);

        let args = cli.page_args();
        assert_eq!(args.filters.grouping.as_deref(), Some("Work"));
        assert_eq!(args.filters.status.as_deref(), Some("Overdue"));
        assert_eq!(args.filters.priority.as_deref(), Some("1 (Highest)"));
        assert_eq!(args.format, OutputFormat::Json);
    }

    #[test]
    fn passphrase_comes_before_query() {
        let cli = Cli::try_parse_from([
            "taskboard", "google", "--query", "p=second&x=1", "--passphrase", "first",
        ]).unwrap();
        let args = cli.page_args();
        assert_eq!(args.query[PASSPHRASE_ARG], vec!["first".to_string(), "second".to_string()]);
        assert_eq!(args.query["x"], vec!["1".to_string()]);
    }

    #[test]
    fn usage_errors() {
        let err = Cli::try_parse_from(["taskboard", "--status"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidValue);

        let err = Cli::try_parse_from(["taskboard", "--bogus"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownArgument);

        let err = Cli::try_parse_from(["taskboard", "calendar"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);

        let err = Cli::try_parse_from(["taskboard", "google", "todoist"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownArgument);
    }

    #[test]
    fn filter_changes() {
        let mut args = PageArgs::default();
        assert_eq!(apply_filter_change(&mut args, "status=Overdue\n"), FilterChange::Changed);
        assert_eq!(apply_filter_change(&mut args, " project = Work "), FilterChange::Changed);
        assert_eq!(args.filters.status.as_deref(), Some("Overdue"));
        assert_eq!(args.filters.grouping.as_deref(), Some("Work"));

        assert_eq!(apply_filter_change(&mut args, "colour=red"), FilterChange::Invalid("Unknown filter colour".to_string()));
        assert!(matches!(apply_filter_change(&mut args, "status"), FilterChange::Invalid(_)));
        assert_eq!(apply_filter_change(&mut args, "q"), FilterChange::Done);
        assert_eq!(apply_filter_change(&mut args, ""), FilterChange::Done);
    }

    #[test]
    fn exit_codes() {
        assert_eq!(exit_code(&PageOutcome::Rendered(String::new())), 0);
        assert_eq!(exit_code(&PageOutcome::Warning(String::new())), 0);
        assert_eq!(exit_code(&PageOutcome::Denied(String::new())), 1);
        assert_eq!(exit_code(&PageOutcome::Error(String::new())), 1);
    }
}
