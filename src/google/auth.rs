//! OAuth 2.0 for Google Tasks, using the "installed application" flow
//!
//! The authorized token is persisted in a JSON file, in the same format Google's own client libraries use
//! (`token`, `refresh_token`, `token_uri`, `client_id`, `client_secret`, `scopes`, `expiry`),
//! so that an existing `token.json` can be reused.

use std::path::{Path, PathBuf};
use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use url::Url;

use crate::client::{check_status, http_client};
use crate::credentials::CredentialContext;
use crate::error::Error;

/// Read-only access to the user's tasks
pub const TASKS_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/tasks.readonly";

const DEFAULT_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/auth";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// How long before its actual expiry a token is considered expired
const EXPIRY_MARGIN_SECONDS: i64 = 60;
/// How long we wait for the user to go through the consent screen
const CONSENT_TIMEOUT: StdDuration = StdDuration::from_secs(600);

const FLOW_COMPLETED_MESSAGE: &str = "The authentication flow has completed. You may close this window.";


/// Stored credentials of an authorized user
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorizedUser {
    #[serde(alias = "access_token")]
    pub token: Option<String>,
    pub refresh_token: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
    pub client_id: String,
    pub client_secret: String,
    #[serde(default)]
    pub scopes: Vec<String>,
    #[serde(default)]
    pub expiry: Option<DateTime<Utc>>,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl std::fmt::Debug for AuthorizedUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthorizedUser")
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "[REDACTED]"))
            .field("token_uri", &self.token_uri)
            .field("client_id", &self.client_id)
            .field("scopes", &self.scopes)
            .field("expiry", &self.expiry)
            .finish()
    }
}

impl AuthorizedUser {
    /// Whether the access token can be used as is
    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        if self.token.is_none() {
            return false;
        }
        match self.expiry {
            None => true,
            Some(expiry) => now + Duration::seconds(EXPIRY_MARGIN_SECONDS) < expiry,
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|err| Error::Authentication(format!("Invalid token file {:?}: {}", path, err)))
    }

    pub fn save_to_file(&self, path: &Path) -> Result<(), Error> {
        if let Some(parent) = path.parent() {
            if parent.as_os_str().is_empty() == false {
                std::fs::create_dir_all(parent)?;
            }
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}


/// The OAuth client of a Google Cloud project, as downloaded from the Cloud console
#[derive(Clone, Debug, Deserialize)]
pub struct ClientSecrets {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_auth_uri")]
    pub auth_uri: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_auth_uri() -> String {
    DEFAULT_AUTH_URI.to_string()
}

#[derive(Deserialize)]
struct ClientSecretsFile {
    installed: Option<ClientSecrets>,
    web: Option<ClientSecrets>,
}

impl ClientSecrets {
    pub fn from_file(path: &Path) -> Result<Self, Error> {
        let content = std::fs::read_to_string(path)
            .map_err(|err| Error::Authentication(format!("Unable to read the OAuth client secrets {:?}: {}", path, err)))?;
        let file: ClientSecretsFile = serde_json::from_str(&content)
            .map_err(|err| Error::Authentication(format!("Invalid OAuth client secrets {:?}: {}", path, err)))?;

        file.installed
            .or(file.web)
            .ok_or_else(|| Error::Authentication(format!("{:?} has neither an 'installed' nor a 'web' client", path)))
    }
}


#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: Option<i64>,
    refresh_token: Option<String>,
    scope: Option<String>,
}

impl TokenResponse {
    fn expiry(&self) -> Option<DateTime<Utc>> {
        self.expires_in.map(|seconds| Utc::now() + Duration::seconds(seconds))
    }
}


/// Gets (and keeps fresh) an access token for the Google Tasks API
pub struct GoogleAuthenticator {
    client_secrets: PathBuf,
    token_file: PathBuf,
    http: reqwest::Client,
}

impl GoogleAuthenticator {
    pub fn new(client_secrets: PathBuf, token_file: PathBuf) -> Result<Self, Error> {
        Ok(Self { client_secrets, token_file, http: http_client()? })
    }

    /// Returns a valid access token.
    ///
    /// In this order, this uses the token of the credential context, the token file, a refreshed token,
    /// or finally asks the user for their consent in a web browser.
    pub async fn access_token(&self, context: &mut CredentialContext) -> Result<String, Error> {
        let now = Utc::now();
        let known = match context.google() {
            Some(user) => Some(user.clone()),
            None => self.load_token_file()?,
        };

        let user = match known {
            Some(user) if user.is_valid(now) => user,
            Some(user) if user.refresh_token.is_some() => {
                log::info!("Google token has expired, refreshing it");
                let refreshed = self.refresh(&user).await?;
                refreshed.save_to_file(&self.token_file)?;
                refreshed
            },
            _ => {
                log::info!("No usable Google token, starting the consent flow");
                let authorized = self.run_consent_flow().await?;
                authorized.save_to_file(&self.token_file)?;
                authorized
            },
        };

        let token = user.token.clone()
            .ok_or_else(|| Error::Authentication("Google did not provide an access token".to_string()))?;
        context.set_google(user);
        Ok(token)
    }

    fn load_token_file(&self) -> Result<Option<AuthorizedUser>, Error> {
        if self.token_file.exists() == false {
            log::debug!("No token file at {:?}", self.token_file);
            return Ok(None);
        }
        AuthorizedUser::from_file(&self.token_file).map(Some)
    }

    /// Exchange the refresh token for a new access token
    pub async fn refresh(&self, user: &AuthorizedUser) -> Result<AuthorizedUser, Error> {
        let refresh_token = user.refresh_token.as_deref()
            .ok_or_else(|| Error::Authentication("No refresh token available".to_string()))?;

        let response = self.http
            .post(&user.token_uri)
            .form(&[
                ("client_id", user.client_id.as_str()),
                ("client_secret", user.client_secret.as_str()),
                ("refresh_token", refresh_token),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await?;
        let token: TokenResponse = check_token_reply(response).await?;

        let mut refreshed = user.clone();
        refreshed.expiry = token.expiry();
        refreshed.token = Some(token.access_token);
        if let Some(new_refresh_token) = token.refresh_token {
            refreshed.refresh_token = Some(new_refresh_token);
        }
        Ok(refreshed)
    }

    async fn run_consent_flow(&self) -> Result<AuthorizedUser, Error> {
        let secrets = ClientSecrets::from_file(&self.client_secrets)?;

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let port = listener.local_addr()?.port();
        let redirect_uri = format!("http://localhost:{}/", port);
        let state = uuid::Uuid::new_v4().to_hyphenated().to_string();

        let consent_url = consent_url(&secrets, &redirect_uri, &state)?;
        eprintln!("Please visit this URL to authorize this application: {}", consent_url);

        let code = match tokio::time::timeout(CONSENT_TIMEOUT, receive_authorization_code(&listener, &state)).await {
            Err(_) => return Err(Error::Authentication("Timed out waiting for the Google consent".to_string())),
            Ok(code) => code?,
        };

        let response = self.http
            .post(&secrets.token_uri)
            .form(&[
                ("code", code.as_str()),
                ("client_id", secrets.client_id.as_str()),
                ("client_secret", secrets.client_secret.as_str()),
                ("redirect_uri", redirect_uri.as_str()),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await?;
        let token: TokenResponse = check_token_reply(response).await?;

        let scopes = match &token.scope {
            Some(scope) => scope.split_whitespace().map(String::from).collect(),
            None => vec![TASKS_READONLY_SCOPE.to_string()],
        };
        Ok(AuthorizedUser {
            expiry: token.expiry(),
            token: Some(token.access_token),
            refresh_token: token.refresh_token,
            token_uri: secrets.token_uri,
            client_id: secrets.client_id,
            client_secret: secrets.client_secret,
            scopes,
        })
    }
}

/// Token endpoint errors are authentication failures, whatever their HTTP status
async fn check_token_reply(response: reqwest::Response) -> Result<TokenResponse, Error> {
    let response = match check_status(response).await {
        Err(Error::Transport(detail)) => return Err(Error::Authentication(detail)),
        other => other?,
    };
    Ok(response.json::<TokenResponse>().await?)
}

/// The URL of the consent screen
pub fn consent_url(secrets: &ClientSecrets, redirect_uri: &str, state: &str) -> Result<Url, Error> {
    let url = Url::parse_with_params(&secrets.auth_uri, &[
        ("response_type", "code"),
        ("client_id", secrets.client_id.as_str()),
        ("redirect_uri", redirect_uri),
        ("scope", TASKS_READONLY_SCOPE),
        ("state", state),
        ("access_type", "offline"),
        ("prompt", "consent"),
    ])?;
    Ok(url)
}

/// Wait for the browser to be redirected to our loopback listener, and extract the authorization code
pub async fn receive_authorization_code(listener: &TcpListener, expected_state: &str) -> Result<String, Error> {
    let (mut stream, peer) = listener.accept().await?;
    log::debug!("OAuth redirect received from {}", peer);

    let request_line = read_request_line(&mut stream).await?;
    let target = request_line.split_whitespace().nth(1).unwrap_or("/");
    let url = Url::parse(&format!("http://localhost{}", target))?;

    let mut code = None;
    let mut state = None;
    let mut error = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "code" => code = Some(value.into_owned()),
            "state" => state = Some(value.into_owned()),
            "error" => error = Some(value.into_owned()),
            _ => (),
        }
    }

    let outcome = if let Some(error) = error {
        Err(Error::Authentication(format!("Google denied the authorization: {}", error)))
    } else if state.as_deref() != Some(expected_state) {
        Err(Error::Authentication("Invalid OAuth state in the redirect".to_string()))
    } else {
        code.ok_or_else(|| Error::Authentication("Missing authorization code in the redirect".to_string()))
    };

    let message = match &outcome {
        Ok(_) => FLOW_COMPLETED_MESSAGE.to_string(),
        Err(err) => format!("Authorization failed: {}", err),
    };
    if let Err(err) = respond(&mut stream, &message).await {
        log::warn!("Unable to answer the OAuth redirect: {}", err);
    }
    outcome
}

async fn read_request_line(stream: &mut TcpStream) -> Result<String, Error> {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        buffer.extend_from_slice(&chunk[..n]);
        if buffer.windows(4).any(|w| w == b"\r\n\r\n") || buffer.len() > 16 * 1024 {
            break;
        }
    }
    let request = String::from_utf8_lossy(&buffer);
    Ok(request.lines().next().unwrap_or("").to_string())
}

async fn respond(stream: &mut TcpStream, message: &str) -> std::io::Result<()> {
    let body = format!("{}\n", message);
    let response = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: text/plain; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        body.len(),
        body
    );
    stream.write_all(response.as_bytes()).await?;
    stream.shutdown().await
}
