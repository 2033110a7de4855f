//! GitHub API client for fetching release information.

use std::time::Duration;

use reqwest::blocking::{Client, Response};
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT};
use serde::de::DeserializeOwned;

use super::types::GitHubRelease;
use crate::error::{Result, UpdateError};
use crate::release::{ReleaseDescriptor, ReleaseIdentity};
use crate::source::ReleaseSource;

/// GitHub API base URL.
const GITHUB_API_URL: &str = "https://api.github.com";

/// User agent string for API and download requests.
pub(crate) const USER_AGENT_VALUE: &str = concat!("leapfrog-updater/", env!("CARGO_PKG_VERSION"));

/// HTTP request timeout for metadata calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Environment variable holding an optional API token.
const TOKEN_ENV: &str = "GITHUB_TOKEN";

/// Blocking GitHub client for release metadata and asset downloads.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    api: Client,
    pub(crate) downloads: Client,
    base_url: String,
}

impl GitHubClient {
    /// Creates a client against the public GitHub API.
    pub fn new() -> Result<Self> {
        Self::with_base_url(GITHUB_API_URL)
    }

    /// Creates a client against a custom API root (GitHub Enterprise, tests).
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static("2022-11-28"),
        );
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));

        if let Ok(token) = std::env::var(TOKEN_ENV) {
            match HeaderValue::from_str(&format!("Bearer {}", token.trim())) {
                Ok(mut value) => {
                    value.set_sensitive(true);
                    headers.insert(AUTHORIZATION, value);
                    tracing::debug!("Using {} for API requests", TOKEN_ENV);
                }
                Err(_) => tracing::warn!("Ignoring {}: not a valid header value", TOKEN_ENV),
            }
        }

        let api = Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| UpdateError::Network(format!("failed to create HTTP client: {e}")))?;

        // Downloads have no overall timeout: they run to completion or fail.
        let downloads = Client::builder()
            .user_agent(USER_AGENT_VALUE)
            .timeout(None)
            .build()
            .map_err(|e| UpdateError::Network(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            api,
            downloads,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// URL of the latest release endpoint.
    fn latest_release_url(&self, identity: &ReleaseIdentity) -> String {
        format!(
            "{}/repos/{}/{}/releases/latest",
            self.base_url, identity.owner, identity.project
        )
    }

    /// URL of the release list endpoint.
    fn releases_url(&self, identity: &ReleaseIdentity) -> String {
        format!(
            "{}/repos/{}/{}/releases",
            self.base_url, identity.owner, identity.project
        )
    }

    fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        tracing::debug!("GET {}", url);
        let response = self.api.get(url).send()?;
        let response = check_status(response)?;
        let body = response.text()?;
        Ok(serde_json::from_str(&body)?)
    }
}

impl ReleaseSource for GitHubClient {
    fn latest_release(&self, identity: &ReleaseIdentity) -> Result<ReleaseDescriptor> {
        let release: GitHubRelease = self.get_json(&self.latest_release_url(identity))?;
        Ok(release.into())
    }

    fn releases(&self, identity: &ReleaseIdentity) -> Result<Vec<ReleaseDescriptor>> {
        let releases: Vec<GitHubRelease> = self.get_json(&self.releases_url(identity))?;
        Ok(releases.into_iter().map(ReleaseDescriptor::from).collect())
    }
}

/// Maps non-success statuses to errors, detecting rate limiting.
pub(crate) fn check_status(response: Response) -> Result<Response> {
    let status = response.status();

    if status == reqwest::StatusCode::FORBIDDEN
        && response
            .headers()
            .get("x-ratelimit-remaining")
            .is_some_and(|remaining| remaining.to_str().unwrap_or("1") == "0")
    {
        let retry_after = response
            .headers()
            .get("x-ratelimit-reset")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok())
            .map(|reset| {
                let now = std::time::SystemTime::now()
                    .duration_since(std::time::UNIX_EPOCH)
                    .map(|d| d.as_secs())
                    .unwrap_or(0);
                reset.saturating_sub(now)
            })
            .unwrap_or(60);

        return Err(UpdateError::RateLimited { retry_after });
    }

    if status == reqwest::StatusCode::NOT_FOUND {
        return Err(UpdateError::Network(format!(
            "not found: {}",
            response.url()
        )));
    }

    if !status.is_success() {
        let url = response.url().to_string();
        let body = response.text().unwrap_or_default();
        return Err(UpdateError::Network(format!(
            "request to {} failed ({}): {}",
            url, status, body
        )));
    }

    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        assert!(GitHubClient::new().is_ok());
    }

    #[test]
    fn test_endpoint_urls() {
        let client = GitHubClient::with_base_url("https://ghe.example.com/api/v3/").unwrap();
        let identity = ReleaseIdentity::new("octo", "widget");
        assert_eq!(
            client.latest_release_url(&identity),
            "https://ghe.example.com/api/v3/repos/octo/widget/releases/latest"
        );
        assert_eq!(
            client.releases_url(&identity),
            "https://ghe.example.com/api/v3/repos/octo/widget/releases"
        );
    }

    #[test]
    fn test_user_agent() {
        assert!(USER_AGENT_VALUE.starts_with("leapfrog-updater/"));
    }
}
