//! Hosting API client backed by reqwest
//!
//! Talks to two hosts: the REST API for repository listings and the raw
//! content host for manifest files. Neither call is retried.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{Client, Url};

use crate::config::GitHubSettings;
use crate::domain::repo_card::{
    HostingClient, ManifestDocument, ManifestFetch, RepositorySummary, MANIFEST_FILE_NAME,
};
use crate::domain::DomainError;

const GITHUB_ACCEPT: &str = "application/vnd.github+json";

/// Configuration for [`GitHubClient`]
#[derive(Debug, Clone)]
pub struct GitHubClientConfig {
    pub api_base_url: String,
    pub raw_content_base_url: String,
    /// Credential sent as `Authorization: token <value>` on API calls
    pub token: Option<String>,
    pub user_agent: String,
    pub per_page: u32,
    pub timeout: Duration,
}

impl Default for GitHubClientConfig {
    fn default() -> Self {
        Self::from(&GitHubSettings::default())
    }
}

impl From<&GitHubSettings> for GitHubClientConfig {
    fn from(settings: &GitHubSettings) -> Self {
        Self {
            api_base_url: settings.api_base_url.clone(),
            raw_content_base_url: settings.raw_content_base_url.clone(),
            token: settings.token.clone(),
            user_agent: settings.user_agent.clone(),
            per_page: settings.per_page,
            timeout: Duration::from_secs(settings.timeout_secs),
        }
    }
}

impl GitHubClientConfig {
    /// Points both hosts at the same base URL (useful for local mocks)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        self.api_base_url = base_url.clone();
        self.raw_content_base_url = base_url;
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }
}

/// GitHub implementation of [`HostingClient`]
#[derive(Debug, Clone)]
pub struct GitHubClient {
    client: Client,
    config: GitHubClientConfig,
}

impl GitHubClient {
    pub fn new(config: GitHubClientConfig) -> Result<Self, DomainError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent).map_err(|e| {
                DomainError::configuration(format!("Invalid user agent: {}", e))
            })?,
        );

        // Validate both base URLs up front so misconfiguration fails at startup
        endpoint(&config.api_base_url, &[])?;
        endpoint(&config.raw_content_base_url, &[])?;

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| DomainError::configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &GitHubClientConfig {
        &self.config
    }
}

/// Appends percent-encoded path segments to `base`
fn endpoint(base: &str, segments: &[&str]) -> Result<Url, DomainError> {
    let mut url = Url::parse(base)
        .map_err(|e| DomainError::configuration(format!("Invalid base URL '{}': {}", base, e)))?;

    url.path_segments_mut()
        .map_err(|_| DomainError::configuration(format!("Base URL '{}' cannot have a path", base)))?
        .pop_if_empty()
        .extend(segments);

    Ok(url)
}

#[async_trait]
impl HostingClient for GitHubClient {
    async fn list_repositories(
        &self,
        username: &str,
    ) -> Result<Vec<RepositorySummary>, DomainError> {
        let url = endpoint(&self.config.api_base_url, &["users", username, "repos"])?;
        let per_page = self.config.per_page.to_string();

        let mut request = self
            .client
            .get(url)
            .query(&[("type", "public"), ("per_page", per_page.as_str())])
            .header(ACCEPT, GITHUB_ACCEPT);

        if let Some(token) = &self.config.token {
            request = request.header(AUTHORIZATION, format!("token {}", token));
        }

        let response = request
            .send()
            .await
            .map_err(|e| DomainError::internal(format!("Repository listing request failed: {}", e)))?;

        let status = response.status();

        if !status.is_success() {
            return Err(DomainError::upstream(
                status.as_u16(),
                format!(
                    "GitHub API error: {}",
                    status.canonical_reason().unwrap_or("Unknown Status")
                ),
            ));
        }

        response
            .json::<Vec<RepositorySummary>>()
            .await
            .map_err(|e| DomainError::internal(format!("Failed to decode repository listing: {}", e)))
    }

    async fn fetch_manifest(
        &self,
        username: &str,
        repository: &str,
        branch: &str,
    ) -> Result<ManifestFetch, DomainError> {
        let mut segments = vec![username, repository];
        segments.extend(branch.split('/'));
        segments.push(MANIFEST_FILE_NAME);

        let url = endpoint(&self.config.raw_content_base_url, &segments)?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| DomainError::internal(format!("Manifest request failed: {}", e)))?;

        let status = response.status();

        if !status.is_success() {
            return Ok(ManifestFetch::Missing(status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| DomainError::internal(format!("Failed to read manifest body: {}", e)))?;

        Ok(match serde_json::from_slice::<ManifestDocument>(&body) {
            Ok(manifest) => ManifestFetch::Found(manifest),
            Err(e) => ManifestFetch::Malformed(e.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_appends_segments() {
        let url = endpoint("https://api.github.com", &["users", "alice", "repos"]).unwrap();
        assert_eq!(url.as_str(), "https://api.github.com/users/alice/repos");
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let url = endpoint("https://ghe.example.com/api/v3/", &["users", "alice"]).unwrap();
        assert_eq!(url.as_str(), "https://ghe.example.com/api/v3/users/alice");
    }

    #[test]
    fn test_endpoint_encodes_segments() {
        let url = endpoint("https://api.github.com", &["users", "a b?", "repos"]).unwrap();
        assert_eq!(url.as_str(), "https://api.github.com/users/a%20b%3F/repos");
    }

    #[test]
    fn test_endpoint_rejects_invalid_base() {
        let result = endpoint("not a url", &[]);
        assert!(matches!(result, Err(DomainError::Configuration { .. })));
    }

    #[test]
    fn test_client_rejects_invalid_base_url() {
        let config = GitHubClientConfig::default().with_base_url("::nope");
        assert!(GitHubClient::new(config).is_err());
    }

    #[test]
    fn test_config_from_settings() {
        let settings = GitHubSettings {
            token: Some("secret".to_string()),
            timeout_secs: 3,
            ..Default::default()
        };

        let config = GitHubClientConfig::from(&settings);
        assert_eq!(config.token.as_deref(), Some("secret"));
        assert_eq!(config.timeout, Duration::from_secs(3));
        assert_eq!(config.per_page, 100);
        assert_eq!(config.raw_content_base_url, "https://raw.githubusercontent.com");
    }
}
