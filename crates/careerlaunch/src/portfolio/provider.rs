//! External code-hosting provider client.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::config::ProviderConfig;

const GITHUB_ACCEPT: &str = "application/vnd.github.v3+json";

/// Public profile of the account behind a portfolio.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderProfile {
    pub login: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub html_url: Option<String>,
    #[serde(default)]
    pub public_repos: u64,
    #[serde(default)]
    pub followers: u64,
    #[serde(default)]
    pub following: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryLicense {
    pub name: String,
}

/// One hosted repository as reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderRepository {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub html_url: String,
    #[serde(default)]
    pub clone_url: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub stargazers_count: u64,
    #[serde(default)]
    pub forks_count: u64,
    #[serde(default)]
    pub watchers_count: u64,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub license: Option<RepositoryLicense>,
    #[serde(default)]
    pub fork: bool,
    #[serde(default)]
    pub private: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl ProviderRepository {
    /// Stable URL identifying the repository within a portfolio.
    pub fn source_url(&self) -> &str {
        self.clone_url.as_deref().unwrap_or(&self.html_url)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("failed to build provider client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("provider request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("provider account '{0}' not found")]
    NotFound(String),
    #[error("provider returned {status} for {resource}")]
    Status { status: u16, resource: String },
    #[error("'{0}' is not a valid provider path segment")]
    InvalidSegment(String),
}

/// Read access to a code-hosting platform. Every call is independently fallible.
#[async_trait]
pub trait RepositoryProvider: Send + Sync {
    async fn get_profile(
        &self,
        username: &str,
        access_token: Option<&str>,
    ) -> Result<ProviderProfile, ProviderError>;

    /// One page of repositories, newest activity first; an empty page ends the listing.
    async fn list_repositories(
        &self,
        username: &str,
        access_token: Option<&str>,
        page: u32,
    ) -> Result<Vec<ProviderRepository>, ProviderError>;

    /// Bytes of source per language.
    async fn get_languages(
        &self,
        owner: &str,
        repository: &str,
        access_token: Option<&str>,
    ) -> Result<BTreeMap<String, u64>, ProviderError>;
}

/// Accepts account and repository names that cannot escape their URL path
/// segment: ASCII alphanumerics, `-`, `_` and `.`, never `.` or `..` alone.
fn path_segment(value: &str) -> Result<&str, ProviderError> {
    let allowed = value
        .chars()
        .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | '.'));
    if value.is_empty() || value == "." || value == ".." || !allowed {
        return Err(ProviderError::InvalidSegment(value.to_string()));
    }
    Ok(value)
}

/// REST client for the GitHub v3 API.
#[derive(Debug, Clone)]
pub struct GitHubProvider {
    client: reqwest::Client,
    base_url: String,
    per_page: u32,
}

impl GitHubProvider {
    pub fn new(config: &ProviderConfig) -> Result<Self, ProviderError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(GITHUB_ACCEPT));

        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .timeout(config.timeout())
            .build()
            .map_err(ProviderError::Client)?;

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            per_page: config.per_page.clamp(1, 100),
        })
    }

    async fn get_json<T>(
        &self,
        path: &str,
        query: &[(&str, String)],
        access_token: Option<&str>,
        resource: &str,
    ) -> Result<T, ProviderError>
    where
        T: DeserializeOwned,
    {
        let mut request = self
            .client
            .get(format!("{}{path}", self.base_url))
            .query(query);
        if let Some(token) = access_token.filter(|token| !token.is_empty()) {
            request = request.header(AUTHORIZATION, format!("token {token}"));
        }

        let response = request.send().await?;
        match response.status() {
            status if status.is_success() => Ok(response.json::<T>().await?),
            StatusCode::NOT_FOUND => Err(ProviderError::NotFound(resource.to_string())),
            status => Err(ProviderError::Status {
                status: status.as_u16(),
                resource: resource.to_string(),
            }),
        }
    }
}

#[async_trait]
impl RepositoryProvider for GitHubProvider {
    async fn get_profile(
        &self,
        username: &str,
        access_token: Option<&str>,
    ) -> Result<ProviderProfile, ProviderError> {
        let username = path_segment(username)?;
        self.get_json(&format!("/users/{username}"), &[], access_token, username)
            .await
    }

    async fn list_repositories(
        &self,
        username: &str,
        access_token: Option<&str>,
        page: u32,
    ) -> Result<Vec<ProviderRepository>, ProviderError> {
        let username = path_segment(username)?;
        let query = [
            ("type", "all".to_string()),
            ("sort", "updated".to_string()),
            ("direction", "desc".to_string()),
            ("page", page.to_string()),
            ("per_page", self.per_page.to_string()),
        ];
        self.get_json(
            &format!("/users/{username}/repos"),
            &query,
            access_token,
            username,
        )
        .await
    }

    async fn get_languages(
        &self,
        owner: &str,
        repository: &str,
        access_token: Option<&str>,
    ) -> Result<BTreeMap<String, u64>, ProviderError> {
        let owner = path_segment(owner)?;
        let repository = path_segment(repository)?;
        self.get_json(
            &format!("/repos/{owner}/{repository}/languages"),
            &[],
            access_token,
            &format!("{owner}/{repository}"),
        )
        .await
    }
}
