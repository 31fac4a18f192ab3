//! Pages: chrome, the home page, the passphrase gate and the dashboard pipeline.
//!
//! A page is rendered into a buffer, and only returned once complete, so that a failure
//! never leaves a half-rendered dashboard on screen.

use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::NaiveDate;

use crate::cache::NormalizationCache;
use crate::config::{product_name, Settings};
use crate::credentials::{resolve_todoist_token, CredentialContext, SecretStore, TokenPrompt};
use crate::dashboard::{build_view, render_json, FilterInput, TextRenderer};
use crate::error::Error;
use crate::google::{GoogleAuthenticator, GoogleTasksClient};
use crate::todoist::TodoistClient;
use crate::traits::TaskSource;

pub const ACCESS_DENIED: &str = "Access is denied";
/// Name of the query argument that carries the passphrase
pub const PASSPHRASE_ARG: &str = "p";


#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Layout {
    Wide,
    Centered,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SidebarState {
    Expanded,
    Collapsed,
}

/// What is shown around every page
#[derive(Clone, Debug, PartialEq)]
pub struct PageConfig {
    pub page_title: String,
    pub page_icon: String,
    pub layout: Layout,
    pub initial_sidebar_state: SidebarState,
    pub help_link: Option<String>,
    pub report_bug_link: Option<String>,
    pub about_link: Option<String>,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            page_title: product_name(),
            page_icon: "📊".to_string(),
            layout: Layout::Wide,
            initial_sidebar_state: SidebarState::Expanded,
            help_link: None,
            report_bug_link: None,
            about_link: None,
        }
    }
}

impl PageConfig {
    /// Menu entries, only for the links that are set
    pub fn menu_items(&self) -> Vec<(&'static str, &str)> {
        let mut items = Vec::new();
        if let Some(link) = &self.help_link {
            items.push(("Get Help", link.as_str()));
        }
        if let Some(link) = &self.report_bug_link {
            items.push(("Report a bug", link.as_str()));
        }
        if let Some(link) = &self.about_link {
            items.push(("About", link.as_str()));
        }
        items
    }

    /// The banner printed above a page
    pub fn chrome(&self) -> String {
        let width = match self.layout {
            Layout::Wide => 100,
            Layout::Centered => 60,
        };
        let mut chrome = format!("{} {}\n", self.page_icon, self.page_title);
        if self.initial_sidebar_state == SidebarState::Expanded {
            for (label, link) in self.menu_items() {
                chrome.push_str(&format!("  {}: {}\n", label, link));
            }
        }
        chrome.push_str(&"─".repeat(width));
        chrome.push('\n');
        chrome
    }
}


/// The pages of the application
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Page {
    Home,
    GoogleTasks,
    Todoist,
}

impl Page {
    pub const ALL: [Page; 3] = [Page::Home, Page::GoogleTasks, Page::Todoist];

    pub fn name(&self) -> &'static str {
        match self {
            Page::Home => "Getting started",
            Page::GoogleTasks => "Google Tasks",
            Page::Todoist => "Todoist",
        }
    }

    pub fn command(&self) -> &'static str {
        match self {
            Page::Home => "home",
            Page::GoogleTasks => "google",
            Page::Todoist => "todoist",
        }
    }
}

impl Display for Page {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Page {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "home" | "" => Ok(Page::Home),
            "google" | "google-tasks" | "gtasks" => Ok(Page::GoogleTasks),
            "todoist" => Ok(Page::Todoist),
            other => Err(format!("Unknown page '{}' (expected one of: home, google, todoist)", other)),
        }
    }
}

pub fn render_home(config: &PageConfig) -> String {
    let mut page = config.chrome();
    page.push_str(&format!("{}\n", config.page_title));
    page.push_str("Dashboards for your Google Tasks and Todoist tasks\n\n");
    for p in Page::ALL.iter() {
        page.push_str(&format!("  {:<8} {}\n", p.command(), p.name()));
    }
    page
}


/// Query arguments of a page, as in `?p=secret&p=other`
pub type QueryArgs = HashMap<String, Vec<String>>;

pub fn parse_query_args(query: &str) -> QueryArgs {
    let mut args = QueryArgs::new();
    for (key, value) in url::form_urlencoded::parse(query.trim_start_matches('?').as_bytes()) {
        args.entry(key.into_owned()).or_insert_with(Vec::new).push(value.into_owned());
    }
    args
}

/// Whether the first `p` argument is one of the known passphrases.
/// A missing argument, or a store without passphrases, is denied.
pub fn is_authorized(args: &QueryArgs, secrets: &SecretStore) -> bool {
    let candidate = match args.get(PASSPHRASE_ARG).and_then(|values| values.first()) {
        None => return false,
        Some(c) => c,
    };
    secrets.passphrases().iter().any(|known| known == candidate)
}


#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

/// How a page was asked for
#[derive(Clone, Debug, PartialEq)]
pub struct PageArgs {
    pub filters: FilterInput,
    pub query: QueryArgs,
    pub format: OutputFormat,
    pub color: bool,
}

impl Default for PageArgs {
    fn default() -> Self {
        Self {
            filters: FilterInput::default(),
            query: QueryArgs::new(),
            format: OutputFormat::Text,
            color: true,
        }
    }
}


/// What a page run produced
#[derive(Clone, Debug, PartialEq)]
pub enum PageOutcome {
    Rendered(String),
    /// Nothing to show, for a reason the user can fix (no tasks, no token yet...)
    Warning(String),
    Denied(String),
    Error(String),
}

impl PageOutcome {
    fn from_result(result: Result<String, Error>) -> Self {
        match result {
            Ok(page) => PageOutcome::Rendered(page),
            Err(err) if err.is_warning() => {
                log::warn!("{}", err);
                PageOutcome::Warning(err.to_string())
            },
            Err(err) => {
                log::error!("Page aborted: {}", err);
                PageOutcome::Error(format!("An error occurred: {}", err))
            },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, PageOutcome::Rendered(_) | PageOutcome::Warning(_))
    }
}


/// Fetch, normalize and render a dashboard.
///
/// Any error aborts the whole dashboard: empty results become a warning, the rest an error message.
pub async fn run_dashboard<S: TaskSource + Sync>(source: &S, cache: &mut NormalizationCache, config: &PageConfig, args: &PageArgs, today: NaiveDate) -> PageOutcome {
    PageOutcome::from_result(render_dashboard(source, cache, config, args, today).await)
}

async fn render_dashboard<S: TaskSource + Sync>(source: &S, cache: &mut NormalizationCache, config: &PageConfig, args: &PageArgs, today: NaiveDate) -> Result<String, Error> {
    let snapshot = source.fetch().await?;
    let table = cache.get_or_normalize(source.kind(), &snapshot.containers, &snapshot.tasks, today)?;
    let view = build_view(&table, &args.filters)?;

    match args.format {
        OutputFormat::Json => render_json(&view),
        OutputFormat::Text => {
            let mut page = config.chrome();
            page.push_str(&TextRenderer::new(args.color).render(&view));
            Ok(page)
        },
    }
}


/// State kept across page runs: credentials and the normalization memo
pub struct Session {
    settings: Settings,
    secrets: SecretStore,
    page_config: PageConfig,
    credentials: CredentialContext,
    cache: NormalizationCache,
    today: Option<NaiveDate>,
}

impl Session {
    pub fn new(settings: Settings, secrets: SecretStore) -> Self {
        Self {
            settings,
            secrets,
            page_config: PageConfig::default(),
            credentials: CredentialContext::new(),
            cache: NormalizationCache::new(),
            today: None,
        }
    }

    pub fn with_page_config(mut self, page_config: PageConfig) -> Self {
        self.page_config = page_config;
        self
    }

    /// Pretend today is another day
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    pub fn settings(&self) -> &Settings               { &self.settings    }
    pub fn credentials(&self) -> &CredentialContext   { &self.credentials }
    pub fn cache(&self) -> &NormalizationCache        { &self.cache       }

    pub fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| chrono::Local::now().date_naive())
    }

    pub async fn run_page(&mut self, page: Page, args: &PageArgs, prompt: &mut dyn TokenPrompt) -> PageOutcome {
        if page != Page::Home && self.settings.require_passphrase && is_authorized(&args.query, &self.secrets) == false {
            log::info!("Denied access to {}", page);
            return PageOutcome::Denied(format!("{}{}\n", self.page_config.chrome(), ACCESS_DENIED));
        }

        let result = match page {
            Page::Home => Ok(render_home(&self.page_config)),
            Page::GoogleTasks => self.google_dashboard(args).await,
            Page::Todoist => self.todoist_dashboard(args, prompt).await,
        };

        if let Err(Error::Authentication(_)) = &result {
            // The stored credentials were rejected, ask again next time
            self.credentials.clear();
        }
        PageOutcome::from_result(result)
    }

    async fn google_dashboard(&mut self, args: &PageArgs) -> Result<String, Error> {
        let authenticator = GoogleAuthenticator::new(
            self.settings.google_client_secrets.clone(),
            self.settings.google_token_file.clone(),
        )?;
        let token = authenticator.access_token(&mut self.credentials).await?;
        let client = GoogleTasksClient::new(&self.settings.google_api_base, token)?;

        let today = self.today();
        render_dashboard(&client, &mut self.cache, &self.page_config, args, today).await
    }

    async fn todoist_dashboard(&mut self, args: &PageArgs, prompt: &mut dyn TokenPrompt) -> Result<String, Error> {
        let env_value = std::env::var(&self.settings.todoist_token_env).ok();
        let token = resolve_todoist_token(&mut self.credentials, env_value, &self.secrets, prompt)?;
        let client = TodoistClient::new(&self.settings.todoist_api_base, token)?;

        let today = self.today();
        render_dashboard(&client, &mut self.cache, &self.page_config, args, today).await
    }
}
