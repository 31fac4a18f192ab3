//! Support for library configuration options

use std::error::Error as StdError;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// The product name, used in the HTTP `User-Agent` and in the page chrome.
/// Feel free to override it when initing this library.
pub static PRODUCT_NAME: Lazy<Arc<Mutex<String>>> = Lazy::new(|| Arc::new(Mutex::new("taskboard".to_string())));

/// Environment variable that overrides the location of the settings file
pub const CONFIG_PATH_ENV: &str = "TASKBOARD_CONFIG";
/// Default location of the settings file, relative to the working directory
pub const DEFAULT_CONFIG_PATH: &str = "taskboard.json";

/// Returns the current product name
pub fn product_name() -> String {
    match PRODUCT_NAME.lock() {
        Ok(name) => name.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    }
}

/// The `User-Agent` sent with every API request
pub fn user_agent() -> String {
    format!("{}/{}", product_name(), env!("CARGO_PKG_VERSION"))
}

/// Runtime settings, read from a JSON file.
///
/// Every field has a default, so that an empty (or missing) file is a valid configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// OAuth client secrets of the Google Cloud project (the "installed app" JSON file)
    pub google_client_secrets: PathBuf,
    /// Where the authorized Google token is persisted
    pub google_token_file: PathBuf,
    /// Base URL of the Google Tasks API
    pub google_api_base: String,
    /// Base URL of the Todoist REST API
    pub todoist_api_base: String,
    /// Environment variable that may hold the Todoist API token
    pub todoist_token_env: String,
    /// The local secret store (Todoist token, passphrases)
    pub secrets_file: PathBuf,
    /// Whether dashboards are behind the passphrase gate
    pub require_passphrase: bool,
    /// Whether the text renderer emits ANSI colors
    pub color: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            google_client_secrets: PathBuf::from("credentials.json"),
            google_token_file: PathBuf::from("token.json"),
            google_api_base: String::from(crate::google::DEFAULT_API_BASE),
            todoist_api_base: String::from(crate::todoist::DEFAULT_API_BASE),
            todoist_token_env: String::from(crate::credentials::TODOIST_TOKEN_ENV),
            secrets_file: PathBuf::from("secrets.json"),
            require_passphrase: false,
            color: true,
        }
    }
}

impl Settings {
    /// Read settings from a file
    pub fn from_file(path: &Path) -> Result<Self, Error> {
        let file = std::fs::File::open(path)
            .map_err(|err| Error::Config(format!("Unable to open {:?}: {}", path, err)))?;
        serde_json::from_reader(file)
            .map_err(|err| Error::Config(format!("Invalid settings in {:?}: {}", path, err)))
    }

    /// Where the settings file is: `TASKBOARD_CONFIG`, or the default path
    pub fn default_path() -> PathBuf {
        std::env::var(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH))
    }

    /// Read the settings file pointed to by `TASKBOARD_CONFIG` (or the default path).
    pub fn load() -> Result<Self, Box<dyn StdError>> {
        Self::load_from(&Self::default_path())
    }

    /// A missing file falls back to the defaults. An unreadable or invalid file is an error.
    pub fn load_from(path: &Path) -> Result<Self, Box<dyn StdError>> {
        if path.exists() == false {
            log::debug!("No settings file at {:?}, using defaults", path);
            return Ok(Self::default());
        }
        log::debug!("Loading settings from {:?}", path);
        Ok(Self::from_file(path)?)
    }
}
