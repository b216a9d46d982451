use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::response::Response;
use chrono::Utc;
use serde_json::Value;

use crate::audit::{AuditEntry, AuditFilter, AuditLog};
use crate::identity::{
    AccountStatus, Caller, Company, CompanyId, DirectoryRepository, RecruiterProfile, Role,
    StudentProfile, StudentRepository, UserAccount, UserId,
};
use crate::memory::MemoryStore;
use crate::portfolio::{
    portfolio_router, Platform, Portfolio, PortfolioDraft, PortfolioId, PortfolioRepository,
    PortfolioService, Project, ProjectId, ProviderError, ProviderProfile, ProviderRepository,
    RepositoryProvider,
};
use crate::repository::RepositoryError;

pub(super) type Portfolios = PortfolioService<MemoryStore, FakeProvider>;

/// Scripted provider: serves `repositories` in pages of `page_size` and can be
/// switched into a failing mode.
#[derive(Default)]
pub(super) struct FakeProvider {
    pub(super) repositories: Mutex<Vec<ProviderRepository>>,
    pub(super) page_size: usize,
    pub(super) failing: AtomicBool,
    pub(super) broken_languages: BTreeSet<String>,
    pub(super) page_requests: AtomicUsize,
}

impl FakeProvider {
    pub(super) fn with(repositories: Vec<ProviderRepository>) -> Self {
        Self {
            repositories: Mutex::new(repositories),
            page_size: 2,
            ..Self::default()
        }
    }

    pub(super) fn fail(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    pub(super) fn replace(&self, repositories: Vec<ProviderRepository>) {
        *self.repositories.lock().expect("provider mutex") = repositories;
    }

    fn check(&self) -> Result<(), ProviderError> {
        if self.failing.load(Ordering::SeqCst) {
            Err(ProviderError::Status {
                status: 503,
                resource: "users/octo".to_string(),
            })
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl RepositoryProvider for FakeProvider {
    async fn get_profile(
        &self,
        username: &str,
        _access_token: Option<&str>,
    ) -> Result<ProviderProfile, ProviderError> {
        self.check()?;
        Ok(ProviderProfile {
            login: username.to_string(),
            name: Some("Octo Student".to_string()),
            avatar_url: None,
            html_url: Some(format!("https://github.com/{username}")),
            public_repos: self.repositories.lock().expect("provider mutex").len() as u64,
            followers: 3,
            following: 1,
        })
    }

    async fn list_repositories(
        &self,
        _username: &str,
        _access_token: Option<&str>,
        page: u32,
    ) -> Result<Vec<ProviderRepository>, ProviderError> {
        self.check()?;
        self.page_requests.fetch_add(1, Ordering::SeqCst);
        let repositories = self.repositories.lock().expect("provider mutex");
        let start = (page as usize - 1) * self.page_size;
        Ok(repositories
            .iter()
            .skip(start)
            .take(self.page_size)
            .cloned()
            .collect())
    }

    async fn get_languages(
        &self,
        _owner: &str,
        repository: &str,
        _access_token: Option<&str>,
    ) -> Result<BTreeMap<String, u64>, ProviderError> {
        if self.broken_languages.contains(repository) {
            return Err(ProviderError::NotFound(repository.to_string()));
        }
        let repositories = self.repositories.lock().expect("provider mutex");
        let language = repositories
            .iter()
            .find(|candidate| candidate.name == repository)
            .and_then(|candidate| candidate.language.clone());
        Ok(language
            .map(|language| BTreeMap::from([(language, 1000)]))
            .unwrap_or_default())
    }
}

/// Memory store whose project inserts fail once `break_projects` is called.
#[derive(Default)]
pub(super) struct BrittleStore {
    pub(super) inner: MemoryStore,
    broken_projects: AtomicBool,
}

impl BrittleStore {
    pub(super) fn break_projects(&self) {
        self.broken_projects.store(true, Ordering::SeqCst);
    }
}

impl PortfolioRepository for BrittleStore {
    fn insert_portfolio(&self, portfolio: Portfolio) -> Result<Portfolio, RepositoryError> {
        self.inner.insert_portfolio(portfolio)
    }

    fn update_portfolio(&self, portfolio: Portfolio) -> Result<(), RepositoryError> {
        self.inner.update_portfolio(portfolio)
    }

    fn remove_portfolio(&self, id: &PortfolioId) -> Result<(), RepositoryError> {
        self.inner.remove_portfolio(id)
    }

    fn fetch_portfolio(&self, id: &PortfolioId) -> Result<Option<Portfolio>, RepositoryError> {
        self.inner.fetch_portfolio(id)
    }

    fn list_portfolios(&self) -> Result<Vec<Portfolio>, RepositoryError> {
        self.inner.list_portfolios()
    }

    fn insert_project(&self, project: Project) -> Result<Project, RepositoryError> {
        if self.broken_projects.load(Ordering::SeqCst) {
            return Err(RepositoryError::Unavailable("project table offline".to_string()));
        }
        self.inner.insert_project(project)
    }

    fn update_project(&self, project: Project) -> Result<(), RepositoryError> {
        self.inner.update_project(project)
    }

    fn remove_project(&self, id: &ProjectId) -> Result<(), RepositoryError> {
        self.inner.remove_project(id)
    }

    fn fetch_project(&self, id: &ProjectId) -> Result<Option<Project>, RepositoryError> {
        self.inner.fetch_project(id)
    }

    fn list_projects(&self, portfolio_id: &PortfolioId) -> Result<Vec<Project>, RepositoryError> {
        self.inner.list_projects(portfolio_id)
    }

    fn find_project_by_repository(
        &self,
        portfolio_id: &PortfolioId,
        repository_url: &str,
    ) -> Result<Option<Project>, RepositoryError> {
        self.inner
            .find_project_by_repository(portfolio_id, repository_url)
    }
}

impl StudentRepository for BrittleStore {
    fn fetch_student(&self, id: &UserId) -> Result<Option<StudentProfile>, RepositoryError> {
        self.inner.fetch_student(id)
    }

    fn save_student(&self, profile: StudentProfile) -> Result<(), RepositoryError> {
        self.inner.save_student(profile)
    }
}

impl DirectoryRepository for BrittleStore {
    fn fetch_user(&self, id: &UserId) -> Result<Option<UserAccount>, RepositoryError> {
        self.inner.fetch_user(id)
    }

    fn list_users(&self) -> Result<Vec<UserAccount>, RepositoryError> {
        self.inner.list_users()
    }

    fn save_user(&self, user: UserAccount) -> Result<(), RepositoryError> {
        self.inner.save_user(user)
    }

    fn fetch_recruiter(&self, id: &UserId) -> Result<Option<RecruiterProfile>, RepositoryError> {
        self.inner.fetch_recruiter(id)
    }

    fn save_recruiter(&self, profile: RecruiterProfile) -> Result<(), RepositoryError> {
        self.inner.save_recruiter(profile)
    }

    fn fetch_company(&self, id: &CompanyId) -> Result<Option<Company>, RepositoryError> {
        self.inner.fetch_company(id)
    }

    fn list_companies(&self) -> Result<Vec<Company>, RepositoryError> {
        self.inner.list_companies()
    }

    fn save_company(&self, company: Company) -> Result<(), RepositoryError> {
        self.inner.save_company(company)
    }
}

impl AuditLog for BrittleStore {
    fn append_audit(&self, entry: AuditEntry) -> Result<(), RepositoryError> {
        self.inner.append_audit(entry)
    }

    fn query_audit(&self, filter: &AuditFilter) -> Result<Vec<AuditEntry>, RepositoryError> {
        self.inner.query_audit(filter)
    }
}

pub(super) fn repository(name: &str, language: &str, stars: u64) -> ProviderRepository {
    ProviderRepository {
        name: name.to_string(),
        description: Some(format!("{name} built with docker")),
        html_url: format!("https://github.com/octo/{name}"),
        clone_url: Some(format!("https://github.com/octo/{name}.git")),
        language: Some(language.to_string()),
        stargazers_count: stars,
        forks_count: 1,
        watchers_count: stars,
        size: 120,
        topics: vec!["machine-learning".to_string()],
        license: None,
        fork: false,
        private: false,
        created_at: Some(Utc::now()),
        updated_at: Some(Utc::now()),
    }
}

pub(super) fn owner() -> Caller {
    Caller::new("stu-1", Role::Student)
}

pub(super) fn classmate() -> Caller {
    Caller::new("stu-2", Role::Student)
}

pub(super) fn recruiter() -> Caller {
    Caller::new("rec-1", Role::Recruiter)
}

pub(super) fn store() -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    seed(&store);
    store
}

pub(super) fn seed(store: &MemoryStore) {
    for (id, name, role) in [
        ("stu-1", "Ada Lovelace", Role::Student),
        ("stu-2", "Grace Hopper", Role::Student),
        ("rec-1", "Riley Recruiter", Role::Recruiter),
    ] {
        store
            .add_user(UserAccount {
                id: UserId::new(id),
                name: name.to_string(),
                email: format!("{id}@example.com"),
                role,
                status: AccountStatus::Active,
                created_at: Utc::now(),
            })
            .expect("seed user");
    }
    store
        .add_student(StudentProfile {
            user_id: UserId::new("stu-1"),
            skills: BTreeSet::from(["communication".to_string()]),
            ..StudentProfile::default()
        })
        .expect("seed student");
}

pub(super) fn build_service(provider: FakeProvider) -> (Arc<Portfolios>, Arc<MemoryStore>, Arc<FakeProvider>) {
    let store = store();
    let provider = Arc::new(provider);
    let service = Arc::new(PortfolioService::new(store.clone(), provider.clone(), 5));
    (service, store, provider)
}

pub(super) fn router_with_service(service: Arc<Portfolios>) -> axum::Router {
    portfolio_router(service)
}

pub(super) fn github_draft() -> PortfolioDraft {
    PortfolioDraft {
        platform: Platform::Github,
        profile_url: "https://github.com/octo".to_string(),
        title: Some("Open source work".to_string()),
        description: None,
        is_public: true,
        auto_sync: false,
    }
}

pub(super) fn create_github(service: &Portfolios) -> Portfolio {
    service
        .create(&owner(), github_draft())
        .expect("portfolio created")
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
