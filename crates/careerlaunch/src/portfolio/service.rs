use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};

use super::domain::{
    Portfolio, PortfolioChanges, PortfolioDraft, PortfolioId, PortfolioSearch,
    PortfolioStatistics, Project, ProjectChanges, ProjectDraft, ProjectId, ProjectStatus,
    SyncReport, SyncRequest, SyncState, SyncStatus,
};
use super::provider::{ProviderError, ProviderProfile, ProviderRepository, RepositoryProvider};
use super::repository::PortfolioRepository;
use super::skills::extract_skills;
use crate::audit::{self, AuditEntry, AuditLog};
use crate::catalog::matching::contains_ignore_case;
use crate::error::{error_response, ErrorKind};
use crate::identity::{Caller, DirectoryRepository, Role, StudentRepository, UserId};
use crate::repository::{IdSequence, Page, PageRequest, RepositoryError};

static PORTFOLIO_SEQUENCE: IdSequence = IdSequence::new("pf");
static PROJECT_SEQUENCE: IdSequence = IdSequence::new("prj");

/// Storage the portfolio component reads and writes.
pub trait PortfolioStore:
    PortfolioRepository + StudentRepository + DirectoryRepository + AuditLog
{
}

impl<T> PortfolioStore for T where
    T: PortfolioRepository + StudentRepository + DirectoryRepository + AuditLog
{
}

/// Everything fetched from the provider for one sync run.
struct Upstream {
    profile: ProviderProfile,
    repositories: Vec<ProviderRepository>,
    statistics: PortfolioStatistics,
}

/// Portfolio management and reconciliation against the repository provider.
pub struct PortfolioService<S, P> {
    store: Arc<S>,
    provider: Arc<P>,
    max_pages: u32,
}

impl<S, P> PortfolioService<S, P>
where
    S: PortfolioStore + 'static,
    P: RepositoryProvider + 'static,
{
    pub fn new(store: Arc<S>, provider: Arc<P>, max_pages: u32) -> Self {
        Self {
            store,
            provider,
            max_pages: max_pages.max(1),
        }
    }

    pub fn create(
        &self,
        caller: &Caller,
        draft: PortfolioDraft,
    ) -> Result<Portfolio, PortfolioError> {
        if !caller.is(Role::Student) {
            return Err(PortfolioError::Forbidden(
                "only students can create portfolios".to_string(),
            ));
        }
        if draft.profile_url.trim().is_empty() {
            return Err(PortfolioError::BadRequest(
                "profile url must not be empty".to_string(),
            ));
        }

        let now = Utc::now();
        let portfolio = Portfolio {
            id: PortfolioId(PORTFOLIO_SEQUENCE.next_id()),
            student_id: caller.user_id.clone(),
            platform: draft.platform,
            profile_url: draft.profile_url,
            title: draft.title,
            description: draft.description,
            is_verified: false,
            is_public: draft.is_public,
            is_featured: false,
            auto_sync: draft.auto_sync,
            profile: None,
            statistics: None,
            sync_status: None,
            last_synced: None,
            created_at: now,
            updated_at: now,
        };

        let stored = self
            .store
            .insert_portfolio(portfolio)
            .map_err(|error| match error {
                RepositoryError::Conflict => PortfolioError::BadRequest(format!(
                    "portfolio for {} already exists",
                    draft.platform.label()
                )),
                other => PortfolioError::Repository(other),
            })?;

        audit::record(
            self.store.as_ref(),
            AuditEntry::new(&caller.user_id, "portfolio.created", stored.id.to_string())
                .with_detail("platform", stored.platform.label()),
        );
        Ok(stored)
    }

    pub fn list_for_student(&self, student_id: &UserId) -> Result<Vec<Portfolio>, PortfolioError> {
        let mut portfolios: Vec<Portfolio> = self
            .store
            .list_portfolios()?
            .into_iter()
            .filter(|portfolio| portfolio.is_owned_by(student_id))
            .collect();
        portfolios.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
        Ok(portfolios)
    }

    /// Private portfolios are visible to their owner and to staff roles only.
    pub fn get(&self, portfolio_id: &PortfolioId, caller: &Caller) -> Result<Portfolio, PortfolioError> {
        let portfolio = self.load(portfolio_id)?;
        if portfolio.is_public || !caller.is(Role::Student) || portfolio.is_owned_by(&caller.user_id) {
            Ok(portfolio)
        } else {
            Err(PortfolioError::Forbidden(
                "this portfolio is private".to_string(),
            ))
        }
    }

    pub fn update(
        &self,
        portfolio_id: &PortfolioId,
        changes: PortfolioChanges,
        caller: &Caller,
    ) -> Result<Portfolio, PortfolioError> {
        let mut portfolio = self.owned(portfolio_id, caller, "update")?;
        changes.apply(&mut portfolio);
        portfolio.updated_at = Utc::now();
        self.store.update_portfolio(portfolio.clone())?;
        Ok(portfolio)
    }

    /// Delete a portfolio together with its projects.
    pub fn delete(&self, portfolio_id: &PortfolioId, caller: &Caller) -> Result<(), PortfolioError> {
        let portfolio = self.owned(portfolio_id, caller, "delete")?;
        self.store.remove_portfolio(&portfolio.id)?;
        audit::record(
            self.store.as_ref(),
            AuditEntry::new(&caller.user_id, "portfolio.deleted", portfolio.id.to_string()),
        );
        Ok(())
    }

    /// Reconcile the portfolio with the provider and merge discovered skills
    /// into the owning student's profile.
    pub async fn sync(
        &self,
        portfolio_id: &PortfolioId,
        request: SyncRequest,
        caller: &Caller,
    ) -> Result<SyncReport, PortfolioError> {
        let portfolio = self.owned(portfolio_id, caller, "sync")?;
        if !portfolio.platform.is_syncable() {
            return Err(PortfolioError::BadRequest(format!(
                "{} portfolios cannot be synced",
                portfolio.platform.label()
            )));
        }
        let username = request.username.trim();
        if username.is_empty() {
            return Err(PortfolioError::BadRequest(
                "a provider username is required".to_string(),
            ));
        }
        if !is_provider_login(username) {
            return Err(PortfolioError::BadRequest(format!(
                "'{username}' is not a valid {} username",
                portfolio.platform.label()
            )));
        }

        let upstream = match self
            .fetch_upstream(username, request.access_token.as_deref())
            .await
        {
            Ok(upstream) => upstream,
            Err(error) => {
                self.record_sync_failure(portfolio, &error);
                return Err(PortfolioError::SyncFailed(error));
            }
        };

        match self.apply_upstream(portfolio.clone(), upstream) {
            Ok(report) => {
                tracing::info!(
                    portfolio_id = %portfolio.id,
                    imported = report.projects_imported,
                    updated = report.projects_updated,
                    skills = report.skills_found.len(),
                    "portfolio synced"
                );
                audit::record(
                    self.store.as_ref(),
                    AuditEntry::new(&caller.user_id, "portfolio.synced", portfolio.id.to_string())
                        .with_detail("projects_imported", report.projects_imported.to_string())
                        .with_detail("projects_updated", report.projects_updated.to_string()),
                );
                Ok(report)
            }
            Err(error) => {
                self.record_sync_failure(portfolio, &error);
                Err(error)
            }
        }
    }

    /// Store projects, statistics, and merged skills for a fetched upstream.
    fn apply_upstream(
        &self,
        mut portfolio: Portfolio,
        upstream: Upstream,
    ) -> Result<SyncReport, PortfolioError> {
        let now = Utc::now();
        let mut report = SyncReport::default();
        for repository in upstream.repositories.iter().filter(|repository| !repository.fork) {
            if self.upsert_project(&portfolio.id, repository, now)? {
                report.projects_imported += 1;
            } else {
                report.projects_updated += 1;
            }
        }

        let languages: Vec<String> = upstream
            .statistics
            .language_distribution
            .keys()
            .cloned()
            .collect();
        portfolio.profile = Some(upstream.profile);
        portfolio.statistics = Some(upstream.statistics);
        portfolio.last_synced = Some(now);
        portfolio.is_verified = true;
        portfolio.updated_at = now;
        portfolio.sync_status = Some(SyncStatus {
            state: SyncState::Success,
            last_error: None,
            last_successful_sync: Some(now),
            attempted_at: now,
        });
        self.store.update_portfolio(portfolio.clone())?;

        let skills = extract_skills(&upstream.repositories);
        self.merge_student_skills(&portfolio.student_id, &skills, languages)?;
        report.skills_found = skills.into_iter().collect();
        Ok(report)
    }

    /// Write the error marker over the portfolio as it stood before the sync,
    /// keeping the previous successful sync time.
    fn record_sync_failure(&self, mut portfolio: Portfolio, error: &dyn std::error::Error) {
        tracing::warn!(portfolio_id = %portfolio.id, %error, "portfolio sync failed");
        portfolio.sync_status = Some(SyncStatus {
            state: SyncState::Error,
            last_error: Some(error.to_string()),
            last_successful_sync: portfolio.last_successful_sync(),
            attempted_at: Utc::now(),
        });
        let portfolio_id = portfolio.id.clone();
        if let Err(error) = self.store.update_portfolio(portfolio) {
            tracing::warn!(portfolio_id = %portfolio_id, %error, "could not record sync failure");
        }
    }

    pub fn create_project(
        &self,
        portfolio_id: &PortfolioId,
        draft: ProjectDraft,
        caller: &Caller,
    ) -> Result<Project, PortfolioError> {
        let portfolio = self.owned(portfolio_id, caller, "add projects to")?;
        if draft.title.trim().is_empty() {
            return Err(PortfolioError::BadRequest(
                "project title must not be empty".to_string(),
            ));
        }

        let now = Utc::now();
        let project = Project {
            id: ProjectId(PROJECT_SEQUENCE.next_id()),
            portfolio_id: portfolio.id,
            title: draft.title,
            description: draft.description,
            technologies: draft.technologies,
            project_url: draft.project_url,
            repository_url: draft.repository_url,
            status: draft.status,
            stars: 0,
            forks: 0,
            watchers: 0,
            size: 0,
            primary_language: None,
            topics: Vec::new(),
            license: None,
            is_fork: false,
            external_created_at: None,
            external_updated_at: None,
            created_at: now,
            updated_at: now,
        };
        self.store.insert_project(project).map_err(|error| match error {
            RepositoryError::Conflict => PortfolioError::BadRequest(
                "a project for this repository already exists".to_string(),
            ),
            other => PortfolioError::Repository(other),
        })
    }

    /// Projects ordered by stars, then newest first.
    pub fn list_projects(
        &self,
        portfolio_id: &PortfolioId,
        caller: &Caller,
    ) -> Result<Vec<Project>, PortfolioError> {
        let portfolio = self.get(portfolio_id, caller)?;
        let mut projects = self.store.list_projects(&portfolio.id)?;
        projects.sort_by(|a, b| {
            b.stars
                .cmp(&a.stars)
                .then_with(|| b.created_at.cmp(&a.created_at))
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(projects)
    }

    pub fn update_project(
        &self,
        project_id: &ProjectId,
        changes: ProjectChanges,
        caller: &Caller,
    ) -> Result<Project, PortfolioError> {
        let mut project = self.owned_project(project_id, caller, "update")?;
        changes
            .apply(&mut project)
            .map_err(PortfolioError::BadRequest)?;
        project.updated_at = Utc::now();
        self.store.update_project(project.clone())?;
        Ok(project)
    }

    pub fn delete_project(&self, project_id: &ProjectId, caller: &Caller) -> Result<(), PortfolioError> {
        let project = self.owned_project(project_id, caller, "delete")?;
        self.store.remove_project(&project.id)?;
        Ok(())
    }

    /// Public portfolios matching free text, platform, and technology filters.
    pub fn search(&self, query: &PortfolioSearch) -> Result<Page<Portfolio>, PortfolioError> {
        let text = query
            .q
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty());
        let technology = query
            .technology
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty());

        let mut matches = Vec::new();
        for portfolio in self.store.list_portfolios()? {
            if !portfolio.is_public {
                continue;
            }
            if query.platform.is_some_and(|platform| portfolio.platform != platform) {
                continue;
            }
            if let Some(text) = text {
                if !self.matches_text(&portfolio, text)? {
                    continue;
                }
            }
            if let Some(technology) = technology {
                let uses = self.store.list_projects(&portfolio.id)?.iter().any(|project| {
                    project
                        .technologies
                        .iter()
                        .chain(project.primary_language.iter())
                        .any(|value| value.eq_ignore_ascii_case(technology))
                });
                if !uses {
                    continue;
                }
            }
            matches.push(portfolio);
        }

        matches.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then_with(|| b.id.cmp(&a.id)));
        Ok(Page::slice(matches, PageRequest::new(query.page, query.limit)))
    }

    fn matches_text(&self, portfolio: &Portfolio, text: &str) -> Result<bool, PortfolioError> {
        let in_portfolio = [&portfolio.title, &portfolio.description]
            .into_iter()
            .flatten()
            .any(|value| contains_ignore_case(value, text));
        if in_portfolio {
            return Ok(true);
        }
        Ok(self
            .store
            .fetch_user(&portfolio.student_id)?
            .is_some_and(|account| contains_ignore_case(&account.name, text)))
    }

    async fn fetch_upstream(
        &self,
        username: &str,
        access_token: Option<&str>,
    ) -> Result<Upstream, ProviderError> {
        let profile = self.provider.get_profile(username, access_token).await?;

        let mut repositories = Vec::new();
        for page in 1..=self.max_pages {
            let batch = self
                .provider
                .list_repositories(username, access_token, page)
                .await?;
            if batch.is_empty() {
                break;
            }
            repositories.extend(batch);
        }

        let mut statistics = PortfolioStatistics::default();
        let mut languages: BTreeMap<String, u64> = BTreeMap::new();
        for repository in repositories.iter().filter(|repository| !repository.fork) {
            statistics.total_repos += 1;
            statistics.total_stars += repository.stargazers_count;
            statistics.total_forks += repository.forks_count;

            match self
                .provider
                .get_languages(username, &repository.name, access_token)
                .await
            {
                Ok(bytes) => {
                    for (language, count) in bytes {
                        *languages.entry(language).or_default() += count;
                    }
                }
                Err(error) => {
                    tracing::warn!(repository = %repository.name, %error, "skipping language statistics");
                }
            }
        }
        statistics.language_distribution = languages;

        Ok(Upstream {
            profile,
            repositories,
            statistics,
        })
    }

    /// Create or refresh the project mirroring `repository`. Returns `true`
    /// when a new project was created.
    fn upsert_project(
        &self,
        portfolio_id: &PortfolioId,
        repository: &ProviderRepository,
        now: DateTime<Utc>,
    ) -> Result<bool, PortfolioError> {
        let url = repository.source_url();
        let license = repository.license.as_ref().map(|license| license.name.clone());

        match self.store.find_project_by_repository(portfolio_id, url)? {
            Some(mut project) => {
                project.description = repository.description.clone();
                project.project_url = Some(repository.html_url.clone());
                project.primary_language = repository.language.clone();
                project.stars = repository.stargazers_count;
                project.forks = repository.forks_count;
                project.watchers = repository.watchers_count;
                project.size = repository.size;
                project.topics = repository.topics.clone();
                project.license = license;
                project.external_updated_at = repository.updated_at;
                project.updated_at = now;
                self.store.update_project(project)?;
                Ok(false)
            }
            None => {
                let project = Project {
                    id: ProjectId(PROJECT_SEQUENCE.next_id()),
                    portfolio_id: portfolio_id.clone(),
                    title: repository.name.clone(),
                    description: repository.description.clone(),
                    technologies: repository.language.iter().cloned().collect(),
                    project_url: Some(repository.html_url.clone()),
                    repository_url: Some(url.to_string()),
                    status: ProjectStatus::Active,
                    stars: repository.stargazers_count,
                    forks: repository.forks_count,
                    watchers: repository.watchers_count,
                    size: repository.size,
                    primary_language: repository.language.clone(),
                    topics: repository.topics.clone(),
                    license,
                    is_fork: repository.fork,
                    external_created_at: repository.created_at,
                    external_updated_at: repository.updated_at,
                    created_at: now,
                    updated_at: now,
                };
                self.store.insert_project(project)?;
                Ok(true)
            }
        }
    }

    /// Union, never replace: a sync can only grow the declared skill set.
    fn merge_student_skills(
        &self,
        student_id: &UserId,
        skills: &BTreeSet<String>,
        languages: Vec<String>,
    ) -> Result<(), PortfolioError> {
        let Some(mut student) = self.store.fetch_student(student_id)? else {
            tracing::warn!(student_id = %student_id, "no student profile to merge synced skills into");
            return Ok(());
        };
        student.skills.extend(skills.iter().cloned());
        student.programming_languages.extend(languages);
        self.store.save_student(student)?;
        Ok(())
    }

    fn load(&self, portfolio_id: &PortfolioId) -> Result<Portfolio, PortfolioError> {
        self.store
            .fetch_portfolio(portfolio_id)?
            .ok_or_else(|| PortfolioError::NotFound("portfolio not found".to_string()))
    }

    fn owned(
        &self,
        portfolio_id: &PortfolioId,
        caller: &Caller,
        action: &str,
    ) -> Result<Portfolio, PortfolioError> {
        let portfolio = self.load(portfolio_id)?;
        if portfolio.is_owned_by(&caller.user_id) {
            Ok(portfolio)
        } else {
            Err(PortfolioError::Forbidden(format!(
                "you can only {action} your own portfolios"
            )))
        }
    }

    fn owned_project(
        &self,
        project_id: &ProjectId,
        caller: &Caller,
        action: &str,
    ) -> Result<Project, PortfolioError> {
        let project = self
            .store
            .fetch_project(project_id)?
            .ok_or_else(|| PortfolioError::NotFound("project not found".to_string()))?;
        let portfolio = self.load(&project.portfolio_id)?;
        if portfolio.is_owned_by(&caller.user_id) {
            Ok(project)
        } else {
            Err(PortfolioError::Forbidden(format!(
                "you can only {action} your own projects"
            )))
        }
    }
}

/// GitHub login rules: 1 to 39 ASCII alphanumerics or single hyphens, with
/// no leading or trailing hyphen.
fn is_provider_login(username: &str) -> bool {
    username.len() <= 39
        && !username.starts_with('-')
        && !username.ends_with('-')
        && !username.contains("--")
        && username
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '-')
}

/// Error raised by the portfolio component.
#[derive(Debug, thiserror::Error)]
pub enum PortfolioError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("sync failed: {0}")]
    SyncFailed(#[source] ProviderError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl PortfolioError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PortfolioError::NotFound(_) => ErrorKind::NotFound,
            PortfolioError::BadRequest(_) | PortfolioError::SyncFailed(_) => ErrorKind::BadRequest,
            PortfolioError::Forbidden(_) => ErrorKind::Forbidden,
            PortfolioError::Repository(error) => error.kind(),
        }
    }
}

impl IntoResponse for PortfolioError {
    fn into_response(self) -> Response {
        error_response(self.kind(), self.to_string())
    }
}
