use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use axum::response::{IntoResponse, Response};
use chrono::Utc;

use super::domain::{Job, JobChanges, JobDraft, JobId, JobStatus, JobView};
use super::matching::RecommendationFilter;
use super::repository::JobRepository;
use super::search::JobSearchFilters;
use super::stats::JobStats;
use crate::applications::repository::ApplicationRepository;
use crate::applications::service::applied_jobs;
use crate::audit::{self, AuditEntry, AuditLog};
use crate::error::{error_response, ErrorKind};
use crate::identity::{
    Caller, Company, CompanyId, DirectoryRepository, Role, StudentRepository, UserId,
};
use crate::notifications::{notify, JobMatch, Notification, NotificationPublisher, Recipient};
use crate::repository::{IdSequence, Page, RepositoryError};

pub const DEFAULT_RECOMMENDATIONS: usize = 10;
pub const MAX_RECOMMENDATIONS: usize = 50;

static JOB_SEQUENCE: IdSequence = IdSequence::new("job");

/// Storage the catalog reads and writes.
pub trait CatalogStore:
    JobRepository + DirectoryRepository + StudentRepository + ApplicationRepository + AuditLog
{
}

impl<T> CatalogStore for T where
    T: JobRepository + DirectoryRepository + StudentRepository + ApplicationRepository + AuditLog
{
}

/// Publishes, searches, and recommends job postings.
pub struct JobCatalogService<S, N> {
    store: Arc<S>,
    notifier: Arc<N>,
}

impl<S, N> JobCatalogService<S, N>
where
    S: CatalogStore + 'static,
    N: NotificationPublisher + 'static,
{
    pub fn new(store: Arc<S>, notifier: Arc<N>) -> Self {
        Self { store, notifier }
    }

    /// Create a posting for the calling recruiter's company.
    pub fn create(&self, caller: &Caller, draft: JobDraft) -> Result<Job, CatalogError> {
        if !caller.is(Role::Recruiter) {
            return Err(CatalogError::Forbidden(
                "only recruiters can post jobs".to_string(),
            ));
        }
        draft.validate().map_err(CatalogError::BadRequest)?;

        let recruiter = self
            .store
            .fetch_recruiter(&caller.user_id)?
            .ok_or_else(|| CatalogError::NotFound("recruiter profile not found".to_string()))?;

        let now = Utc::now();
        let status = if draft.draft {
            JobStatus::Draft
        } else {
            JobStatus::Active
        };

        let job = Job {
            id: JobId(JOB_SEQUENCE.next_id()),
            title: draft.title.trim().to_string(),
            description: draft.description,
            requirements: draft.requirements,
            skills_required: draft.skills_required,
            experience_level: draft.experience_level,
            job_type: draft.job_type,
            salary: draft.salary,
            location: draft.location,
            is_remote: draft.is_remote,
            is_hybrid: draft.is_hybrid,
            status,
            deadline: draft.deadline,
            category: draft.category,
            tags: draft.tags,
            benefits: draft.benefits,
            positions: draft.positions,
            application_count: 0,
            is_featured: draft.is_featured,
            company_id: recruiter.company_id,
            recruiter_id: caller.user_id.clone(),
            created_at: now,
            updated_at: now,
            published_at: (status == JobStatus::Active).then_some(now),
            closed_at: None,
        };

        let stored = self.store.insert_job(job)?;
        tracing::info!(job_id = %stored.id, company_id = %stored.company_id, status = stored.status.label(), "job created");
        audit::record(
            self.store.as_ref(),
            AuditEntry::new(&caller.user_id, "job.created", stored.id.to_string())
                .with_detail("status", stored.status.label()),
        );
        Ok(stored)
    }

    pub fn get(&self, job_id: &JobId) -> Result<JobView, CatalogError> {
        let job = self.load(job_id)?;
        let company = self.store.fetch_company(&job.company_id)?;
        Ok(job.view(company))
    }

    /// Filter, order, and paginate active postings.
    pub fn search(&self, filters: &JobSearchFilters) -> Result<Page<JobView>, CatalogError> {
        let companies = self.companies()?;
        let mut jobs: Vec<Job> = self
            .store
            .list_jobs()?
            .into_iter()
            .filter(|job| filters.matches(job, companies.get(&job.company_id)))
            .collect();
        filters.sort(&mut jobs);

        let page = Page::slice(jobs, filters.page_request());
        Ok(page.map(|job| {
            let company = companies.get(&job.company_id).cloned();
            job.view(company)
        }))
    }

    /// Soft-match recommendations for a student, newest first.
    pub fn recommend(
        &self,
        student_id: &UserId,
        limit: Option<usize>,
    ) -> Result<Vec<JobView>, CatalogError> {
        let student = self
            .store
            .fetch_student(student_id)?
            .ok_or_else(|| CatalogError::NotFound("student not found".to_string()))?;

        let applied: HashSet<JobId> = applied_jobs(self.store.as_ref(), student_id)?
            .into_iter()
            .collect();

        let companies = self.companies()?;
        let filter = RecommendationFilter::new(&student, &applied);
        let mut jobs: Vec<Job> = self
            .store
            .list_jobs()?
            .into_iter()
            .filter(|job| filter.accepts(job, companies.get(&job.company_id)))
            .collect();
        jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));

        let limit = limit
            .unwrap_or(DEFAULT_RECOMMENDATIONS)
            .clamp(1, MAX_RECOMMENDATIONS);
        Ok(jobs
            .into_iter()
            .take(limit)
            .map(|job| {
                let company = companies.get(&job.company_id).cloned();
                job.view(company)
            })
            .collect())
    }

    /// Active featured postings, newest first.
    pub fn featured(&self, limit: Option<usize>) -> Result<Vec<JobView>, CatalogError> {
        let companies = self.companies()?;
        let mut jobs: Vec<Job> = self
            .store
            .list_jobs()?
            .into_iter()
            .filter(|job| job.status == JobStatus::Active && job.is_featured)
            .collect();
        jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));

        let limit = limit
            .unwrap_or(DEFAULT_RECOMMENDATIONS)
            .clamp(1, MAX_RECOMMENDATIONS);
        Ok(jobs
            .into_iter()
            .take(limit)
            .map(|job| {
                let company = companies.get(&job.company_id).cloned();
                job.view(company)
            })
            .collect())
    }

    pub fn update(
        &self,
        job_id: &JobId,
        changes: JobChanges,
        caller: &Caller,
    ) -> Result<Job, CatalogError> {
        let mut job = self.owned(job_id, caller)?;
        if job.status.is_closed() {
            return Err(CatalogError::BadRequest(
                "closed jobs cannot be edited".to_string(),
            ));
        }
        changes.apply(&mut job).map_err(CatalogError::BadRequest)?;
        job.updated_at = Utc::now();
        self.store.update_job(job.clone())?;

        audit::record(
            self.store.as_ref(),
            AuditEntry::new(&caller.user_id, "job.updated", job.id.to_string()),
        );
        Ok(job)
    }

    /// `draft | paused → active`, stamping the publication time.
    pub fn publish(&self, job_id: &JobId, caller: &Caller) -> Result<Job, CatalogError> {
        let mut job = self.owned(job_id, caller)?;
        if !job.status.can_publish() {
            return Err(CatalogError::BadRequest(format!(
                "cannot publish a {} job",
                job.status.label()
            )));
        }
        let now = Utc::now();
        job.status = JobStatus::Active;
        job.published_at = Some(now);
        job.updated_at = now;
        self.transition(job, caller, "job.published")
    }

    /// `active → paused`.
    pub fn pause(&self, job_id: &JobId, caller: &Caller) -> Result<Job, CatalogError> {
        let mut job = self.owned(job_id, caller)?;
        if !job.status.can_pause() {
            return Err(CatalogError::BadRequest(format!(
                "cannot pause a {} job",
                job.status.label()
            )));
        }
        job.status = JobStatus::Paused;
        job.updated_at = Utc::now();
        self.transition(job, caller, "job.paused")
    }

    /// Any open status moves to `closed`; there is no way back.
    pub fn close(&self, job_id: &JobId, caller: &Caller) -> Result<Job, CatalogError> {
        let mut job = self.owned(job_id, caller)?;
        if job.status.is_closed() {
            return Err(CatalogError::BadRequest("job is already closed".to_string()));
        }
        let now = Utc::now();
        job.status = JobStatus::Closed;
        job.closed_at = Some(now);
        job.updated_at = now;
        self.transition(job, caller, "job.closed")
    }

    /// Remove a posting nobody has applied to yet.
    pub fn delete(&self, job_id: &JobId, caller: &Caller) -> Result<(), CatalogError> {
        let job = self.owned(job_id, caller)?;
        if job.status.is_closed() {
            return Err(CatalogError::BadRequest(
                "closed jobs are kept for reporting and cannot be deleted".to_string(),
            ));
        }
        let applications = self.store.count_applications_for_job(job_id)?;
        if applications > 0 {
            return Err(CatalogError::BadRequest(format!(
                "job has {applications} application(s); close it instead"
            )));
        }

        self.store.remove_job(job_id)?;
        tracing::info!(job_id = %job_id, "job deleted");
        audit::record(
            self.store.as_ref(),
            AuditEntry::new(&caller.user_id, "job.deleted", job_id.to_string()),
        );
        Ok(())
    }

    pub fn stats(&self) -> Result<JobStats, CatalogError> {
        let jobs = self.store.list_jobs()?;
        Ok(JobStats::from_jobs(&jobs))
    }

    /// Run recommendations for a student and queue a digest when any match.
    pub fn notify_matches(
        &self,
        student_id: &UserId,
        limit: Option<usize>,
    ) -> Result<Vec<JobView>, CatalogError> {
        let matches = self.recommend(student_id, limit)?;
        if matches.is_empty() {
            return Ok(matches);
        }

        match self.store.fetch_user(student_id)? {
            Some(account) => notify(
                self.notifier.as_ref(),
                Notification::JobMatches {
                    recipient: Recipient::from(&account),
                    matches: matches
                        .iter()
                        .map(|view| JobMatch {
                            job_id: view.job.id.clone(),
                            title: view.job.title.clone(),
                            company: view.company.as_ref().map(|company| company.name.clone()),
                        })
                        .collect(),
                },
            ),
            None => tracing::warn!(student_id = %student_id, "no account for job match digest"),
        }
        Ok(matches)
    }

    fn load(&self, job_id: &JobId) -> Result<Job, CatalogError> {
        self.store
            .fetch_job(job_id)?
            .ok_or_else(|| CatalogError::NotFound(format!("job {job_id} not found")))
    }

    /// Load a job the caller may mutate: its recruiter, or a platform admin.
    fn owned(&self, job_id: &JobId, caller: &Caller) -> Result<Job, CatalogError> {
        let job = self.load(job_id)?;
        if caller.is(Role::PlatformAdmin) || job.is_owned_by(&caller.user_id) {
            Ok(job)
        } else {
            Err(CatalogError::Forbidden(
                "you can only manage your own job postings".to_string(),
            ))
        }
    }

    fn transition(&self, job: Job, caller: &Caller, action: &str) -> Result<Job, CatalogError> {
        self.store.update_job(job.clone())?;
        tracing::info!(job_id = %job.id, status = job.status.label(), "job status changed");
        audit::record(
            self.store.as_ref(),
            AuditEntry::new(&caller.user_id, action, job.id.to_string())
                .with_detail("status", job.status.label()),
        );
        Ok(job)
    }

    fn companies(&self) -> Result<HashMap<CompanyId, Company>, CatalogError> {
        Ok(self
            .store
            .list_companies()?
            .into_iter()
            .map(|company| (company.id.clone(), company))
            .collect())
    }
}

/// Error raised by the job catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Forbidden(String),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl CatalogError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CatalogError::NotFound(_) => ErrorKind::NotFound,
            CatalogError::BadRequest(_) => ErrorKind::BadRequest,
            CatalogError::Forbidden(_) => ErrorKind::Forbidden,
            CatalogError::Repository(error) => error.kind(),
        }
    }
}

impl IntoResponse for CatalogError {
    fn into_response(self) -> Response {
        error_response(self.kind(), self.to_string())
    }
}
