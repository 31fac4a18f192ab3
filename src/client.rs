//! HTTP plumbing shared by the provider clients

use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use url::Url;

use crate::error::Error;
use crate::utils::one_line;

/// Build the HTTP client every provider client uses
pub fn http_client() -> Result<reqwest::Client, Error> {
    reqwest::Client::builder()
        .user_agent(crate::config::user_agent())
        .build()
        .map_err(|err| Error::Transport(format!("Unable to create an HTTP client: {}", err)))
}

/// Parse an API base URL, such as `https://api.todoist.com/rest/v2`
pub fn parse_base_url(base: &str) -> Result<Url, Error> {
    let url = Url::parse(base)?;
    if url.cannot_be_a_base() {
        return Err(Error::Config(format!("{} cannot be used as an API base URL", base)));
    }
    Ok(url)
}

/// Append path segments to a base URL. Segments are percent-encoded when needed.
pub fn endpoint(base: &Url, segments: &[&str]) -> Result<Url, Error> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| Error::Config(format!("{} cannot be used as an API base URL", base)))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Turn non-success replies into errors.
///
/// 401 and 403 mean the credential has been rejected, anything else is a transport failure.
pub async fn check_status(response: Response) -> Result<Response, Error> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let url = response.url().clone();
    let body = response.text().await.unwrap_or_default();
    let detail = if body.trim().is_empty() {
        format!("Unexpected HTTP status code {} from {}", status, url.path())
    } else {
        format!("Unexpected HTTP status code {} from {}: {}", status, url.path(), one_line(body.trim()))
    };

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(Error::Authentication(detail)),
        _ => Err(Error::Transport(detail)),
    }
}

/// Send an authenticated GET request and decode its JSON reply
pub async fn get_json<T: DeserializeOwned>(http: &reqwest::Client, url: Url, token: &str, query: &[(&str, String)]) -> Result<T, Error> {
    log::trace!("GET {}", url);
    let response = http
        .get(url)
        .bearer_auth(token)
        .query(query)
        .send()
        .await?;

    let response = check_status(response).await?;
    let value = response.json::<T>().await?;
    Ok(value)
}
