//! Errors that can abort a dashboard page

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Missing, invalid or expired credential, with no way to refresh it
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// The provider returned no containers, or no tasks.
    /// This is a recoverable condition, shown to the user as a warning.
    #[error("{0}")]
    EmptyResultSet(String),

    /// A credential is needed and the user has not provided it yet.
    /// Like [`Error::EmptyResultSet`], this is shown as a warning.
    #[error("{0}")]
    CredentialRequired(String),

    /// Any other failure when talking to a provider
    #[error("{0}")]
    Transport(String),

    /// A provider record could not be interpreted (e.g. a malformed date)
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// A filter value that is not among the offered options
    #[error("'{value}' is not a valid {filter} (expected one of: {options})")]
    InvalidSelection { filter: String, value: String, options: String },

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether this error should be shown as a warning rather than an error
    pub fn is_warning(&self) -> bool {
        matches!(self, Error::EmptyResultSet(_) | Error::CredentialRequired(_))
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN => {
                Error::Authentication(err.to_string())
            },
            _ => Error::Transport(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::InvalidData(err.to_string())
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::Config(format!("invalid URL: {}", err))
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warnings() {
        assert!(Error::EmptyResultSet("No task lists found!".into()).is_warning());
        assert!(Error::CredentialRequired("token please".into()).is_warning());
        assert!(Error::Transport("boom".into()).is_warning() == false);
        assert!(Error::Authentication("expired".into()).is_warning() == false);
    }

    #[test]
    fn messages() {
        assert_eq!(Error::EmptyResultSet("No task lists found!".into()).to_string(), "No task lists found!");
        let err = Error::InvalidSelection { filter: "status".into(), value: "Done".into(), options: "All, Active".into() };
        assert_eq!(err.to_string(), "'Done' is not a valid status (expected one of: All, Active)");
    }
}
