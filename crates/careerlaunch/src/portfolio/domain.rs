use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::provider::ProviderProfile;
use crate::identity::UserId;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PortfolioId(pub String);

impl fmt::Display for PortfolioId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProjectId(pub String);

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// External platform a portfolio mirrors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    Github,
    Behance,
    PersonalWebsite,
    Linkedin,
    Dribbble,
}

impl Platform {
    pub const fn label(self) -> &'static str {
        match self {
            Platform::Github => "github",
            Platform::Behance => "behance",
            Platform::PersonalWebsite => "personal_website",
            Platform::Linkedin => "linkedin",
            Platform::Dribbble => "dribbble",
        }
    }

    /// Only code-hosting platforms with a repository provider can be synced.
    pub const fn is_syncable(self) -> bool {
        matches!(self, Platform::Github)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncState {
    Success,
    Error,
}

/// Outcome marker of the most recent sync attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncStatus {
    pub state: SyncState,
    pub last_error: Option<String>,
    pub last_successful_sync: Option<DateTime<Utc>>,
    pub attempted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortfolioStatistics {
    pub total_repos: usize,
    pub total_stars: u64,
    pub total_forks: u64,
    /// Bytes of source per language across non-fork repositories.
    pub language_distribution: BTreeMap<String, u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Portfolio {
    pub id: PortfolioId,
    pub student_id: UserId,
    pub platform: Platform,
    pub profile_url: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub is_verified: bool,
    pub is_public: bool,
    pub is_featured: bool,
    pub auto_sync: bool,
    pub profile: Option<ProviderProfile>,
    pub statistics: Option<PortfolioStatistics>,
    pub sync_status: Option<SyncStatus>,
    pub last_synced: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Portfolio {
    pub fn is_owned_by(&self, student_id: &UserId) -> bool {
        &self.student_id == student_id
    }

    pub fn last_successful_sync(&self) -> Option<DateTime<Utc>> {
        self.sync_status
            .as_ref()
            .and_then(|status| status.last_successful_sync)
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioDraft {
    pub platform: Platform,
    pub profile_url: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_true")]
    pub is_public: bool,
    #[serde(default)]
    pub auto_sync: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PortfolioChanges {
    pub profile_url: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub is_public: Option<bool>,
    pub auto_sync: Option<bool>,
}

impl PortfolioChanges {
    pub fn apply(self, portfolio: &mut Portfolio) {
        if let Some(url) = self.profile_url {
            portfolio.profile_url = url;
        }
        if let Some(title) = self.title {
            portfolio.title = Some(title);
        }
        if let Some(description) = self.description {
            portfolio.description = Some(description);
        }
        if let Some(public) = self.is_public {
            portfolio.is_public = public;
        }
        if let Some(auto_sync) = self.auto_sync {
            portfolio.auto_sync = auto_sync;
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    #[default]
    Active,
    Completed,
    Archived,
}

/// A showcased project, either entered by hand or mirrored from a repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub portfolio_id: PortfolioId,
    pub title: String,
    pub description: Option<String>,
    pub technologies: Vec<String>,
    pub project_url: Option<String>,
    /// Upsert key for synced projects within a portfolio.
    pub repository_url: Option<String>,
    pub status: ProjectStatus,
    pub stars: u64,
    pub forks: u64,
    pub watchers: u64,
    pub size: u64,
    pub primary_language: Option<String>,
    pub topics: Vec<String>,
    pub license: Option<String>,
    pub is_fork: bool,
    pub external_created_at: Option<DateTime<Utc>>,
    pub external_updated_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectDraft {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub technologies: Vec<String>,
    #[serde(default)]
    pub project_url: Option<String>,
    #[serde(default)]
    pub repository_url: Option<String>,
    #[serde(default)]
    pub status: ProjectStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub technologies: Option<Vec<String>>,
    pub project_url: Option<String>,
    pub status: Option<ProjectStatus>,
}

impl ProjectChanges {
    pub fn apply(self, project: &mut Project) -> Result<(), String> {
        if let Some(title) = self.title {
            if title.trim().is_empty() {
                return Err("project title must not be empty".to_string());
            }
            project.title = title;
        }
        if let Some(description) = self.description {
            project.description = Some(description);
        }
        if let Some(technologies) = self.technologies {
            project.technologies = technologies;
        }
        if let Some(url) = self.project_url {
            project.project_url = Some(url);
        }
        if let Some(status) = self.status {
            project.status = status;
        }
        Ok(())
    }
}

/// Credentials for one sync run. The token is never stored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SyncRequest {
    pub username: String,
    #[serde(default)]
    pub access_token: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncReport {
    pub projects_imported: usize,
    pub projects_updated: usize,
    pub skills_found: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortfolioSearch {
    pub q: Option<String>,
    pub platform: Option<Platform>,
    pub technology: Option<String>,
    pub page: Option<usize>,
    pub limit: Option<usize>,
}
