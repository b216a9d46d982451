use std::sync::Arc;

use axum::response::{IntoResponse, Response};
use chrono::{Duration, Utc};

use super::domain::{
    ApplicationFilters, ApplicationId, ApplicationRecord, ApplicationStats, ApplicationStatus,
    ApplicationSubmission, BulkStatusUpdate, BulkUpdateSummary, InterviewInfo, StatusUpdate,
};
use super::repository::ApplicationRepository;
use crate::audit::{self, AuditEntry, AuditLog};
use crate::catalog::domain::{JobId, JobStatus};
use crate::catalog::matching::skills_match_percentage;
use crate::catalog::repository::JobRepository;
use crate::error::{error_response, ErrorKind};
use crate::identity::{Caller, CompanyId, DirectoryRepository, Role, StudentRepository, UserId};
use crate::notifications::{notify, Notification, NotificationPublisher, Recipient};
use crate::repository::{IdSequence, Page, PageRequest, RepositoryError};

const RECENT_WINDOW_DAYS: i64 = 7;
const MAX_SCORE: u8 = 100;

static APPLICATION_SEQUENCE: IdSequence = IdSequence::new("app");

/// Storage the application workflow reads and writes.
pub trait ApplicationStore:
    ApplicationRepository + JobRepository + DirectoryRepository + StudentRepository + AuditLog
{
}

impl<T> ApplicationStore for T where
    T: ApplicationRepository + JobRepository + DirectoryRepository + StudentRepository + AuditLog
{
}

/// Which applications a caller may see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplicationScope {
    Student(UserId),
    Company(CompanyId),
    All,
}

impl ApplicationScope {
    pub fn allows(&self, record: &ApplicationRecord) -> bool {
        match self {
            ApplicationScope::Student(student_id) => &record.student_id == student_id,
            ApplicationScope::Company(company_id) => &record.company_id == company_id,
            ApplicationScope::All => true,
        }
    }
}

/// Service enforcing the submission and status-progression contract.
pub struct ApplicationService<S, N> {
    store: Arc<S>,
    notifier: Arc<N>,
}

impl<S, N> ApplicationService<S, N>
where
    S: ApplicationStore + 'static,
    N: NotificationPublisher + 'static,
{
    pub fn new(store: Arc<S>, notifier: Arc<N>) -> Self {
        Self { store, notifier }
    }

    /// Submit an application for an active job on behalf of the calling student.
    pub fn submit(
        &self,
        caller: &Caller,
        submission: ApplicationSubmission,
    ) -> Result<ApplicationRecord, ApplicationServiceError> {
        if !caller.is(Role::Student) {
            return Err(ApplicationServiceError::Forbidden(
                "only students can apply to jobs".to_string(),
            ));
        }

        let student = self
            .store
            .fetch_student(&caller.user_id)?
            .ok_or_else(|| ApplicationServiceError::NotFound("student not found".to_string()))?;
        let job = self.store.fetch_job(&submission.job_id)?.ok_or_else(|| {
            ApplicationServiceError::NotFound(format!("job {} not found", submission.job_id))
        })?;

        let now = Utc::now();
        if job.status != JobStatus::Active {
            return Err(ApplicationServiceError::BadRequest(
                "job is not accepting applications".to_string(),
            ));
        }
        if job.deadline_passed(now) {
            return Err(ApplicationServiceError::BadRequest(
                "application deadline has passed".to_string(),
            ));
        }
        if self
            .store
            .find_application_for(&caller.user_id, &job.id)?
            .is_some()
        {
            return Err(duplicate_application());
        }

        let mut record = ApplicationRecord {
            id: ApplicationId(APPLICATION_SEQUENCE.next_id()),
            student_id: caller.user_id.clone(),
            job_id: job.id.clone(),
            company_id: job.company_id.clone(),
            status: ApplicationStatus::Submitted,
            cover_letter: submission.cover_letter,
            status_history: Vec::new(),
            recruiter_notes: None,
            interview: None,
            interview_feedback: None,
            rejection_reason: None,
            score: None,
            skills_match_percentage: skills_match_percentage(&job, &student),
            expected_salary: submission.expected_salary,
            availability_date: submission.availability_date,
            submitted_at: now,
            updated_at: now,
        };
        record.record_change(
            ApplicationStatus::Submitted,
            &caller.user_id,
            Some("application submitted".to_string()),
            now,
        );

        let stored = self
            .store
            .insert_application(record)
            .map_err(|error| match error {
                RepositoryError::Conflict => duplicate_application(),
                other => ApplicationServiceError::Repository(other),
            })?;
        let count = self.store.increment_application_count(&job.id)?;

        tracing::info!(
            application_id = %stored.id,
            job_id = %job.id,
            application_count = count,
            "application submitted"
        );
        audit::record(
            self.store.as_ref(),
            AuditEntry::new(&caller.user_id, "application.submitted", stored.id.to_string())
                .with_detail("job_id", job.id.to_string()),
        );
        self.notify_status(&stored);
        Ok(stored)
    }

    /// Progress an application as its company's recruiter or a platform admin.
    pub fn update_status(
        &self,
        application_id: &ApplicationId,
        update: StatusUpdate,
        caller: &Caller,
    ) -> Result<ApplicationRecord, ApplicationServiceError> {
        if caller.is(Role::Student) || caller.is(Role::UniversityAdmin) {
            return Err(ApplicationServiceError::Forbidden(
                "only recruiters and platform admins can update application status".to_string(),
            ));
        }

        let mut record = self.load(application_id)?;
        if !self.scope_for(caller)?.allows(&record) {
            return Err(ApplicationServiceError::Forbidden(
                "application belongs to another company".to_string(),
            ));
        }
        if update.score.is_some_and(|score| score > MAX_SCORE) {
            return Err(ApplicationServiceError::BadRequest(
                "score must be between 0 and 100".to_string(),
            ));
        }

        let previous = record.status;
        if !previous.can_advance_to(update.status) {
            return Err(ApplicationServiceError::BadRequest(format!(
                "cannot move application from {previous} to {}",
                update.status
            )));
        }

        let now = Utc::now();
        if let Some(notes) = &update.notes {
            record.recruiter_notes = Some(notes.clone());
        }
        if let Some(date) = update.interview_date {
            let mut interview = record.interview.take().unwrap_or_default();
            interview.scheduled_date = Some(date);
            if let Some(schedule) = update.interview {
                interview.format = schedule.format.or(interview.format);
                interview.location = schedule.location.or(interview.location);
                interview.interviewer_name =
                    schedule.interviewer_name.or(interview.interviewer_name);
                interview.interviewer_email =
                    schedule.interviewer_email.or(interview.interviewer_email);
                interview.notes = schedule.notes.or(interview.notes);
            }
            record.interview = Some(interview);
        }
        if let Some(feedback) = update.interview_feedback {
            record.interview_feedback = Some(feedback);
        }
        if let Some(reason) = update.rejection_reason {
            record.rejection_reason = Some(reason);
        }
        if let Some(score) = update.score {
            record.score = Some(score);
        }
        record.record_change(update.status, &caller.user_id, update.notes, now);

        self.store.update_application(record.clone())?;

        tracing::info!(
            application_id = %record.id,
            from = previous.label(),
            to = record.status.label(),
            "application status updated"
        );
        audit::record(
            self.store.as_ref(),
            AuditEntry::new(&caller.user_id, "application.status_changed", record.id.to_string())
                .with_detail("from", previous.label())
                .with_detail("to", record.status.label()),
        );

        self.notify_status(&record);
        if record.status == ApplicationStatus::Interviewed && update.interview_date.is_some() {
            if let Some(interview) = record.interview.clone() {
                self.notify_interview(&record, interview);
            }
        }
        Ok(record)
    }

    /// Apply one status to many applications, counting rather than
    /// propagating per-item failures.
    pub fn bulk_update_status(
        &self,
        bulk: BulkStatusUpdate,
        caller: &Caller,
    ) -> BulkUpdateSummary {
        let mut summary = BulkUpdateSummary::default();
        for application_id in &bulk.application_ids {
            let mut update = StatusUpdate::to(bulk.status);
            update.notes = bulk.notes.clone();
            match self.update_status(application_id, update, caller) {
                Ok(_) => summary.updated += 1,
                Err(error) => {
                    summary.failed += 1;
                    tracing::warn!(application_id = %application_id, %error, "bulk status update skipped application");
                }
            }
        }
        summary
    }

    /// Withdraw the calling student's own undecided application.
    pub fn withdraw(
        &self,
        application_id: &ApplicationId,
        caller: &Caller,
    ) -> Result<ApplicationRecord, ApplicationServiceError> {
        let mut record = self
            .store
            .fetch_application(application_id)?
            .filter(|record| caller.is(Role::Student) && record.student_id == caller.user_id)
            .ok_or_else(|| ApplicationServiceError::NotFound("application not found".to_string()))?;

        if record.status == ApplicationStatus::Withdrawn {
            return Err(ApplicationServiceError::BadRequest(
                "application already withdrawn".to_string(),
            ));
        }
        if record.status.is_decided() {
            return Err(ApplicationServiceError::BadRequest(
                "cannot withdraw an application that has already been processed".to_string(),
            ));
        }

        record.record_change(
            ApplicationStatus::Withdrawn,
            &caller.user_id,
            Some("withdrawn by student".to_string()),
            Utc::now(),
        );
        self.store.update_application(record.clone())?;

        tracing::info!(application_id = %record.id, "application withdrawn");
        audit::record(
            self.store.as_ref(),
            AuditEntry::new(&caller.user_id, "application.withdrawn", record.id.to_string()),
        );
        Ok(record)
    }

    pub fn get(
        &self,
        application_id: &ApplicationId,
        caller: &Caller,
    ) -> Result<ApplicationRecord, ApplicationServiceError> {
        let record = self.load(application_id)?;
        if self.scope_for(caller)?.allows(&record) {
            Ok(record)
        } else {
            Err(ApplicationServiceError::Forbidden(
                "you do not have access to this application".to_string(),
            ))
        }
    }

    /// Role-scoped listing, newest submissions first.
    pub fn list(
        &self,
        filters: &ApplicationFilters,
        caller: &Caller,
    ) -> Result<Page<ApplicationRecord>, ApplicationServiceError> {
        let scope = self.scope_for(caller)?;
        let mut records: Vec<ApplicationRecord> = self
            .store
            .list_applications()?
            .into_iter()
            .filter(|record| scope.allows(record) && filters.matches(record))
            .collect();
        records.sort_by(|a, b| {
            b.submitted_at
                .cmp(&a.submitted_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(Page::slice(
            records,
            PageRequest::new(filters.page, filters.limit),
        ))
    }

    pub fn stats(&self, caller: &Caller) -> Result<ApplicationStats, ApplicationServiceError> {
        let scope = self.scope_for(caller)?;
        let since = Utc::now() - Duration::days(RECENT_WINDOW_DAYS);

        let mut stats = ApplicationStats::default();
        for status in ApplicationStatus::ALL {
            stats.by_status.insert(status.label().to_string(), 0);
        }
        for record in self
            .store
            .list_applications()?
            .iter()
            .filter(|record| scope.allows(record))
        {
            stats.total += 1;
            *stats
                .by_status
                .entry(record.status.label().to_string())
                .or_default() += 1;
            if record.submitted_at >= since {
                stats.recent += 1;
            }
        }
        Ok(stats)
    }

    /// Resolve the visibility scope for a caller.
    pub fn scope_for(&self, caller: &Caller) -> Result<ApplicationScope, ApplicationServiceError> {
        match caller.role {
            Role::Student => Ok(ApplicationScope::Student(caller.user_id.clone())),
            Role::Recruiter => {
                let recruiter = self.store.fetch_recruiter(&caller.user_id)?.ok_or_else(|| {
                    ApplicationServiceError::NotFound("recruiter profile not found".to_string())
                })?;
                Ok(ApplicationScope::Company(recruiter.company_id))
            }
            Role::UniversityAdmin | Role::PlatformAdmin => Ok(ApplicationScope::All),
        }
    }

    fn load(&self, application_id: &ApplicationId) -> Result<ApplicationRecord, ApplicationServiceError> {
        self.store.fetch_application(application_id)?.ok_or_else(|| {
            ApplicationServiceError::NotFound(format!("application {application_id} not found"))
        })
    }

    fn notify_status(&self, record: &ApplicationRecord) {
        if let Some((recipient, job_title, company)) = self.notification_context(record) {
            notify(
                self.notifier.as_ref(),
                Notification::ApplicationStatusChanged {
                    recipient,
                    application_id: record.id.clone(),
                    job_title,
                    company,
                    status: record.status,
                },
            );
        }
    }

    fn notify_interview(&self, record: &ApplicationRecord, interview: InterviewInfo) {
        if let Some((recipient, job_title, company)) = self.notification_context(record) {
            notify(
                self.notifier.as_ref(),
                Notification::InterviewScheduled {
                    recipient,
                    application_id: record.id.clone(),
                    job_title,
                    company,
                    interview,
                },
            );
        }
    }

    /// Look up who to tell and what about. Lookup failures only cost the
    /// notification.
    fn notification_context(
        &self,
        record: &ApplicationRecord,
    ) -> Option<(Recipient, String, Option<String>)> {
        let lookup = || -> Result<Option<(Recipient, String, Option<String>)>, RepositoryError> {
            let Some(account) = self.store.fetch_user(&record.student_id)? else {
                return Ok(None);
            };
            let job_title = self
                .store
                .fetch_job(&record.job_id)?
                .map(|job| job.title)
                .unwrap_or_else(|| record.job_id.to_string());
            let company = self
                .store
                .fetch_company(&record.company_id)?
                .map(|company| company.name);
            Ok(Some((Recipient::from(&account), job_title, company)))
        };

        match lookup() {
            Ok(Some(context)) => Some(context),
            Ok(None) => {
                tracing::warn!(application_id = %record.id, "no account to notify");
                None
            }
            Err(error) => {
                tracing::warn!(application_id = %record.id, %error, "notification lookup failed");
                None
            }
        }
    }
}

fn duplicate_application() -> ApplicationServiceError {
    ApplicationServiceError::BadRequest("you have already applied to this job".to_string())
}

/// Error raised by the application workflow.
#[derive(Debug, thiserror::Error)]
pub enum ApplicationServiceError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Forbidden(String),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl ApplicationServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApplicationServiceError::NotFound(_) => ErrorKind::NotFound,
            ApplicationServiceError::BadRequest(_) => ErrorKind::BadRequest,
            ApplicationServiceError::Forbidden(_) => ErrorKind::Forbidden,
            ApplicationServiceError::Repository(error) => error.kind(),
        }
    }
}

impl IntoResponse for ApplicationServiceError {
    fn into_response(self) -> Response {
        error_response(self.kind(), self.to_string())
    }
}

/// Jobs the given student has applied to.
pub fn applied_jobs<R>(repository: &R, student_id: &UserId) -> Result<Vec<JobId>, RepositoryError>
where
    R: ApplicationRepository + ?Sized,
{
    Ok(repository
        .list_applications()?
        .into_iter()
        .filter(|record| &record.student_id == student_id)
        .map(|record| record.job_id)
        .collect())
}
