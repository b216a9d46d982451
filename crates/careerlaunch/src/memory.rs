//! In-process storage used by the API binary, the demo, and tests.
//!
//! A single mutex guards every collection so that compound checks such as
//! "one application per student and job" happen atomically.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::applications::domain::{ApplicationId, ApplicationRecord};
use crate::applications::repository::ApplicationRepository;
use crate::audit::{AuditEntry, AuditFilter, AuditLog};
use crate::catalog::domain::{Job, JobId};
use crate::catalog::repository::JobRepository;
use crate::identity::{
    Company, CompanyId, DirectoryRepository, RecruiterProfile, StudentProfile, StudentRepository,
    UserAccount, UserId,
};
use crate::notifications::{Notification, NotificationError, NotificationPublisher};
use crate::portfolio::domain::{Portfolio, PortfolioId, Project, ProjectId};
use crate::portfolio::repository::PortfolioRepository;
use crate::repository::RepositoryError;

#[derive(Default)]
struct MemoryState {
    users: HashMap<UserId, UserAccount>,
    students: HashMap<UserId, StudentProfile>,
    recruiters: HashMap<UserId, RecruiterProfile>,
    companies: HashMap<CompanyId, Company>,
    jobs: HashMap<JobId, Job>,
    applications: HashMap<ApplicationId, ApplicationRecord>,
    portfolios: HashMap<PortfolioId, Portfolio>,
    projects: HashMap<ProjectId, Project>,
    audit: Vec<AuditEntry>,
}

#[derive(Default, Clone)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> Result<MutexGuard<'_, MemoryState>, RepositoryError> {
        self.state
            .lock()
            .map_err(|_| RepositoryError::Unavailable("memory store mutex poisoned".to_string()))
    }

    pub fn add_user(&self, user: UserAccount) -> Result<(), RepositoryError> {
        self.save_user(user)
    }

    pub fn add_student(&self, profile: StudentProfile) -> Result<(), RepositoryError> {
        self.save_student(profile)
    }

    pub fn add_recruiter(&self, profile: RecruiterProfile) -> Result<(), RepositoryError> {
        self.save_recruiter(profile)
    }

    pub fn add_company(&self, company: Company) -> Result<(), RepositoryError> {
        self.save_company(company)
    }
}

impl DirectoryRepository for MemoryStore {
    fn fetch_user(&self, id: &UserId) -> Result<Option<UserAccount>, RepositoryError> {
        Ok(self.state()?.users.get(id).cloned())
    }

    fn list_users(&self) -> Result<Vec<UserAccount>, RepositoryError> {
        let mut users: Vec<_> = self.state()?.users.values().cloned().collect();
        users.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(users)
    }

    fn save_user(&self, user: UserAccount) -> Result<(), RepositoryError> {
        self.state()?.users.insert(user.id.clone(), user);
        Ok(())
    }

    fn fetch_recruiter(&self, id: &UserId) -> Result<Option<RecruiterProfile>, RepositoryError> {
        Ok(self.state()?.recruiters.get(id).cloned())
    }

    fn save_recruiter(&self, profile: RecruiterProfile) -> Result<(), RepositoryError> {
        self.state()?
            .recruiters
            .insert(profile.user_id.clone(), profile);
        Ok(())
    }

    fn fetch_company(&self, id: &CompanyId) -> Result<Option<Company>, RepositoryError> {
        Ok(self.state()?.companies.get(id).cloned())
    }

    fn list_companies(&self) -> Result<Vec<Company>, RepositoryError> {
        let mut companies: Vec<_> = self.state()?.companies.values().cloned().collect();
        companies.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(companies)
    }

    fn save_company(&self, company: Company) -> Result<(), RepositoryError> {
        self.state()?.companies.insert(company.id.clone(), company);
        Ok(())
    }
}

impl StudentRepository for MemoryStore {
    fn fetch_student(&self, id: &UserId) -> Result<Option<StudentProfile>, RepositoryError> {
        Ok(self.state()?.students.get(id).cloned())
    }

    fn save_student(&self, profile: StudentProfile) -> Result<(), RepositoryError> {
        self.state()?
            .students
            .insert(profile.user_id.clone(), profile);
        Ok(())
    }
}

impl JobRepository for MemoryStore {
    fn insert_job(&self, job: Job) -> Result<Job, RepositoryError> {
        let mut state = self.state()?;
        if state.jobs.contains_key(&job.id) {
            return Err(RepositoryError::Conflict);
        }
        state.jobs.insert(job.id.clone(), job.clone());
        Ok(job)
    }

    fn update_job(&self, job: Job) -> Result<(), RepositoryError> {
        let mut state = self.state()?;
        match state.jobs.get_mut(&job.id) {
            Some(slot) => {
                *slot = job;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn remove_job(&self, id: &JobId) -> Result<(), RepositoryError> {
        self.state()?
            .jobs
            .remove(id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }

    fn fetch_job(&self, id: &JobId) -> Result<Option<Job>, RepositoryError> {
        Ok(self.state()?.jobs.get(id).cloned())
    }

    fn list_jobs(&self) -> Result<Vec<Job>, RepositoryError> {
        let mut jobs: Vec<_> = self.state()?.jobs.values().cloned().collect();
        jobs.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(jobs)
    }

    fn increment_application_count(&self, id: &JobId) -> Result<u64, RepositoryError> {
        let mut state = self.state()?;
        let job = state.jobs.get_mut(id).ok_or(RepositoryError::NotFound)?;
        job.application_count += 1;
        Ok(job.application_count)
    }
}

impl ApplicationRepository for MemoryStore {
    fn insert_application(
        &self,
        record: ApplicationRecord,
    ) -> Result<ApplicationRecord, RepositoryError> {
        let mut state = self.state()?;
        let duplicate = state.applications.values().any(|existing| {
            existing.student_id == record.student_id && existing.job_id == record.job_id
        });
        if duplicate || state.applications.contains_key(&record.id) {
            return Err(RepositoryError::Conflict);
        }
        state.applications.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn update_application(&self, record: ApplicationRecord) -> Result<(), RepositoryError> {
        let mut state = self.state()?;
        match state.applications.get_mut(&record.id) {
            Some(slot) => {
                *slot = record;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn fetch_application(
        &self,
        id: &ApplicationId,
    ) -> Result<Option<ApplicationRecord>, RepositoryError> {
        Ok(self.state()?.applications.get(id).cloned())
    }

    fn find_application_for(
        &self,
        student_id: &UserId,
        job_id: &JobId,
    ) -> Result<Option<ApplicationRecord>, RepositoryError> {
        Ok(self
            .state()?
            .applications
            .values()
            .find(|record| &record.student_id == student_id && &record.job_id == job_id)
            .cloned())
    }

    fn list_applications(&self) -> Result<Vec<ApplicationRecord>, RepositoryError> {
        let mut records: Vec<_> = self.state()?.applications.values().cloned().collect();
        records.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(records)
    }

    fn count_applications_for_job(&self, job_id: &JobId) -> Result<usize, RepositoryError> {
        Ok(self
            .state()?
            .applications
            .values()
            .filter(|record| &record.job_id == job_id)
            .count())
    }
}

impl PortfolioRepository for MemoryStore {
    fn insert_portfolio(&self, portfolio: Portfolio) -> Result<Portfolio, RepositoryError> {
        let mut state = self.state()?;
        let duplicate = state.portfolios.values().any(|existing| {
            existing.student_id == portfolio.student_id && existing.platform == portfolio.platform
        });
        if duplicate || state.portfolios.contains_key(&portfolio.id) {
            return Err(RepositoryError::Conflict);
        }
        state
            .portfolios
            .insert(portfolio.id.clone(), portfolio.clone());
        Ok(portfolio)
    }

    fn update_portfolio(&self, portfolio: Portfolio) -> Result<(), RepositoryError> {
        let mut state = self.state()?;
        match state.portfolios.get_mut(&portfolio.id) {
            Some(slot) => {
                *slot = portfolio;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn remove_portfolio(&self, id: &PortfolioId) -> Result<(), RepositoryError> {
        let mut state = self.state()?;
        state
            .portfolios
            .remove(id)
            .ok_or(RepositoryError::NotFound)?;
        state.projects.retain(|_, project| &project.portfolio_id != id);
        Ok(())
    }

    fn fetch_portfolio(&self, id: &PortfolioId) -> Result<Option<Portfolio>, RepositoryError> {
        Ok(self.state()?.portfolios.get(id).cloned())
    }

    fn list_portfolios(&self) -> Result<Vec<Portfolio>, RepositoryError> {
        let mut portfolios: Vec<_> = self.state()?.portfolios.values().cloned().collect();
        portfolios.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(portfolios)
    }

    fn insert_project(&self, project: Project) -> Result<Project, RepositoryError> {
        let mut state = self.state()?;
        if !state.portfolios.contains_key(&project.portfolio_id) {
            return Err(RepositoryError::NotFound);
        }
        let duplicate = project.repository_url.as_ref().is_some_and(|url| {
            state.projects.values().any(|existing| {
                existing.portfolio_id == project.portfolio_id
                    && existing.repository_url.as_ref() == Some(url)
            })
        });
        if duplicate || state.projects.contains_key(&project.id) {
            return Err(RepositoryError::Conflict);
        }
        state.projects.insert(project.id.clone(), project.clone());
        Ok(project)
    }

    fn update_project(&self, project: Project) -> Result<(), RepositoryError> {
        let mut state = self.state()?;
        match state.projects.get_mut(&project.id) {
            Some(slot) => {
                *slot = project;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn remove_project(&self, id: &ProjectId) -> Result<(), RepositoryError> {
        self.state()?
            .projects
            .remove(id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }

    fn fetch_project(&self, id: &ProjectId) -> Result<Option<Project>, RepositoryError> {
        Ok(self.state()?.projects.get(id).cloned())
    }

    fn list_projects(&self, portfolio_id: &PortfolioId) -> Result<Vec<Project>, RepositoryError> {
        let mut projects: Vec<_> = self
            .state()?
            .projects
            .values()
            .filter(|project| &project.portfolio_id == portfolio_id)
            .cloned()
            .collect();
        projects.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(projects)
    }

    fn find_project_by_repository(
        &self,
        portfolio_id: &PortfolioId,
        repository_url: &str,
    ) -> Result<Option<Project>, RepositoryError> {
        Ok(self
            .state()?
            .projects
            .values()
            .find(|project| {
                &project.portfolio_id == portfolio_id
                    && project.repository_url.as_deref() == Some(repository_url)
            })
            .cloned())
    }
}

impl AuditLog for MemoryStore {
    fn append_audit(&self, entry: AuditEntry) -> Result<(), RepositoryError> {
        self.state()?.audit.push(entry);
        Ok(())
    }

    fn query_audit(&self, filter: &AuditFilter) -> Result<Vec<AuditEntry>, RepositoryError> {
        Ok(self
            .state()?
            .audit
            .iter()
            .rev()
            .filter(|entry| filter.matches(entry))
            .take(filter.limit())
            .cloned()
            .collect())
    }
}

/// Publisher that keeps every notification in memory.
#[derive(Default, Clone)]
pub struct MemoryOutbox {
    sent: Arc<Mutex<Vec<Notification>>>,
}

impl MemoryOutbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        match self.sent.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl NotificationPublisher for MemoryOutbox {
    fn publish(&self, notification: Notification) -> Result<(), NotificationError> {
        self.sent
            .lock()
            .map_err(|_| NotificationError::Delivery("outbox mutex poisoned".to_string()))?
            .push(notification);
        Ok(())
    }
}
