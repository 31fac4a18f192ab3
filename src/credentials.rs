//! Credentials: the session-scoped credential context, the secret store and the Todoist token lookup

use std::io::{BufRead, Write};
use std::path::Path;

use serde::Deserialize;

use crate::error::Error;
use crate::google::auth::AuthorizedUser;

/// Environment variable that may hold the Todoist API token
pub const TODOIST_TOKEN_ENV: &str = "TODOIST_API_TOKEN";

pub const TOKEN_REQUIRED_MESSAGE: &str = "Please enter your Todoist API token to continue.";
/// What the user is asked for. Terminal input is echoed, so say so
pub const TOKEN_QUESTION: &str = "Todoist API token (input is visible)";


/// Credentials obtained during a session.
///
/// This is owned by the session and lent to whatever needs to authenticate, so that
/// credentials are asked (or refreshed) only once per session.
#[derive(Clone, Default)]
pub struct CredentialContext {
    google: Option<AuthorizedUser>,
    todoist_token: Option<String>,
}

impl CredentialContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn google(&self) -> Option<&AuthorizedUser> { self.google.as_ref() }
    pub fn todoist_token(&self) -> Option<&str>     { self.todoist_token.as_deref() }

    pub fn set_google(&mut self, user: AuthorizedUser) {
        self.google = Some(user);
    }
    pub fn set_todoist_token<S: ToString>(&mut self, token: S) {
        self.todoist_token = Some(token.to_string());
    }

    /// Forget every credential, e.g. after one has been rejected
    pub fn clear(&mut self) {
        self.google = None;
        self.todoist_token = None;
    }
}

impl std::fmt::Debug for CredentialContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialContext")
            .field("google", &self.google.as_ref().map(|_| "[REDACTED]"))
            .field("todoist_token", &self.todoist_token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}


/// Deployment secrets, read from a JSON file
#[derive(Clone, Default, Deserialize)]
pub struct SecretStore {
    #[serde(default)]
    pub todoist_api_token: Option<String>,
    #[serde(default)]
    pub passphrases: Option<Vec<String>>,
}

impl std::fmt::Debug for SecretStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretStore")
            .field("todoist_api_token", &self.todoist_api_token.as_ref().map(|_| "[REDACTED]"))
            .field("passphrases", &self.passphrases.as_ref().map(|p| p.len()))
            .finish()
    }
}

impl SecretStore {
    /// Load the store. A missing file is an empty store
    pub fn from_file(path: &Path) -> Result<Self, Error> {
        if path.exists() == false {
            log::debug!("No secret store at {:?}", path);
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|err| Error::Config(format!("Invalid secret store {:?}: {}", path, err)))
    }

    pub fn passphrases(&self) -> &[String] {
        self.passphrases.as_deref().unwrap_or(&[])
    }
}


/// Something that can ask the user for a token
pub trait TokenPrompt {
    /// Returns what the user entered, `None` if they entered nothing
    fn ask(&mut self, question: &str) -> Result<Option<String>, Error>;
}

/// Asks on the terminal
pub struct StdinPrompt;

impl TokenPrompt for StdinPrompt {
    fn ask(&mut self, question: &str) -> Result<Option<String>, Error> {
        eprint!("{}: ", question);
        std::io::stderr().flush()?;

        let mut answer = String::new();
        std::io::stdin().lock().read_line(&mut answer)?;
        let answer = answer.trim();
        if answer.is_empty() {
            Ok(None)
        } else {
            Ok(Some(answer.to_string()))
        }
    }
}

/// Never gets an answer. Used when the session is not interactive
pub struct NoPrompt;

impl TokenPrompt for NoPrompt {
    fn ask(&mut self, _question: &str) -> Result<Option<String>, Error> {
        Ok(None)
    }
}


/// Find the Todoist API token.
///
/// Sources are tried in this order: the credential context, the environment variable,
/// the secret store, and finally the user. The token is kept in the context.
pub fn resolve_todoist_token(
    context: &mut CredentialContext,
    env_value: Option<String>,
    secrets: &SecretStore,
    prompt: &mut dyn TokenPrompt,
) -> Result<String, Error> {
    if let Some(token) = context.todoist_token() {
        return Ok(token.to_string());
    }

    let token = match non_empty(env_value) {
        Some(token) => {
            log::debug!("Using the Todoist token from the environment");
            token
        },
        None => match non_empty(secrets.todoist_api_token.clone()) {
            Some(token) => {
                log::debug!("Using the Todoist token from the secret store");
                token
            },
            None => match non_empty(prompt.ask(TOKEN_QUESTION)?) {
                Some(token) => token,
                None => return Err(Error::CredentialRequired(TOKEN_REQUIRED_MESSAGE.to_string())),
            },
        },
    };

    context.set_todoist_token(&token);
    Ok(token)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| v.is_empty() == false)
}


#[cfg(test)]
mod tests {
    use super::*;

    struct ScriptedPrompt {
        answer: Option<String>,
        asked: u32,
    }

    impl TokenPrompt for ScriptedPrompt {
        fn ask(&mut self, question: &str) -> Result<Option<String>, Error> {
            assert!(question.contains("visible"));
            self.asked += 1;
            Ok(self.answer.clone())
        }
    }

    fn store(token: Option<&str>) -> SecretStore {
        SecretStore { todoist_api_token: token.map(String::from), passphrases: None }
    }

    #[test]
    fn token_precedence() {
        let mut prompt = ScriptedPrompt { answer: Some("typed".into()), asked: 0 };

        let mut context = CredentialContext::new();
        let token = resolve_todoist_token(&mut context, Some("from-env".into()), &store(Some("from-store")), &mut prompt).unwrap();
        assert_eq!(token, "from-env");

        let mut context = CredentialContext::new();
        let token = resolve_todoist_token(&mut context, None, &store(Some("from-store")), &mut prompt).unwrap();
        assert_eq!(token, "from-store");

        let mut context = CredentialContext::new();
        let token = resolve_todoist_token(&mut context, Some("  ".into()), &store(None), &mut prompt).unwrap();
        assert_eq!(token, "typed");
        assert_eq!(prompt.asked, 1);

        // Now that it is known, nobody is asked again
        let token = resolve_todoist_token(&mut context, Some("from-env".into()), &store(None), &mut prompt).unwrap();
        assert_eq!(token, "typed");
        assert_eq!(prompt.asked, 1);
    }

    #[test]
    fn no_token_at_all() {
        let mut context = CredentialContext::new();
        let outcome = resolve_todoist_token(&mut context, None, &store(None), &mut NoPrompt);
        match outcome {
            Err(err @ Error::CredentialRequired(_)) => {
                assert!(err.is_warning());
                assert_eq!(err.to_string(), TOKEN_REQUIRED_MESSAGE);
            },
            other => panic!("unexpected outcome {:?}", other),
        }
        assert!(context.todoist_token().is_none());
    }

    #[test]
    fn secret_store_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = SecretStore::from_file(&dir.path().join("secrets.json")).unwrap();
        assert!(missing.passphrases().is_empty());
        assert!(missing.todoist_api_token.is_none());

        let path = dir.path().join("secrets.json");
        std::fs::write(&path, r#"{ "passphrases": ["open sesame"], "todoist_api_token": "abc" }"#).unwrap();
        let secrets = SecretStore::from_file(&path).unwrap();
        assert_eq!(secrets.passphrases(), &["open sesame".to_string()]);

        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(SecretStore::from_file(&path), Err(Error::Config(_))));
    }

    #[test]
    fn debug_output_hides_secrets() {
        let mut context = CredentialContext::new();
        context.set_todoist_token("super-secret");
        assert!(format!("{:?}", context).contains("super-secret") == false);
        assert!(format!("{:?}", store(Some("super-secret"))).contains("super-secret") == false);
    }
}
