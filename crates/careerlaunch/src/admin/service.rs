use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use axum::response::{IntoResponse, Response};
use chrono::{Duration, Utc};
use serde::Serialize;

use super::report::{CompanyActivity, Report, ReportKind, ReportWindow};
use super::users::{BulkUserAction, BulkUserActionSummary, UserActionRequest};
use crate::applications::repository::ApplicationRepository;
use crate::audit::{self, AuditEntry, AuditFilter, AuditLog};
use crate::catalog::repository::JobRepository;
use crate::error::{error_response, ErrorKind};
use crate::identity::{Caller, CompanyId, DirectoryRepository, Role, UserAccount, UserId};
use crate::repository::RepositoryError;

const RECENT_DAYS: i64 = 30;

/// Storage the admin surface reads.
pub trait AdminStore: DirectoryRepository + JobRepository + ApplicationRepository + AuditLog {}

impl<T> AdminStore for T where
    T: DirectoryRepository + JobRepository + ApplicationRepository + AuditLog
{
}

/// Platform-wide counts shown on the admin dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlatformOverview {
    pub total_users: usize,
    pub total_companies: usize,
    pub total_jobs: usize,
    pub total_applications: usize,
    pub recent_registrations: usize,
    pub users_by_role: BTreeMap<String, usize>,
    pub users_by_status: BTreeMap<String, usize>,
    pub jobs_by_status: BTreeMap<String, usize>,
    pub applications_by_status: BTreeMap<String, usize>,
}

/// Platform reporting and account moderation for platform administrators.
pub struct AdminService<S> {
    store: Arc<S>,
}

impl<S> AdminService<S>
where
    S: AdminStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn overview(&self, caller: &Caller) -> Result<PlatformOverview, AdminError> {
        ensure_admin(caller)?;

        let users = self.store.list_users()?;
        let jobs = self.store.list_jobs()?;
        let applications = self.store.list_applications()?;
        let recent_cutoff = Utc::now() - Duration::days(RECENT_DAYS);

        Ok(PlatformOverview {
            total_users: users.len(),
            total_companies: self.store.list_companies()?.len(),
            total_jobs: jobs.len(),
            total_applications: applications.len(),
            recent_registrations: users
                .iter()
                .filter(|user| user.created_at >= recent_cutoff)
                .count(),
            users_by_role: tally(users.iter().map(|user| user.role.label())),
            users_by_status: tally(users.iter().map(|user| user.status.label())),
            jobs_by_status: tally(jobs.iter().map(|job| job.status.label())),
            applications_by_status: tally(applications.iter().map(|app| app.status.label())),
        })
    }

    /// Build a named report over `window`. Unknown report names are not found.
    pub fn report(
        &self,
        caller: &Caller,
        kind: &str,
        window: ReportWindow,
    ) -> Result<Report, AdminError> {
        ensure_admin(caller)?;
        let kind: ReportKind = kind
            .parse()
            .map_err(|error: super::report::UnknownReport| AdminError::NotFound(error.to_string()))?;

        let report = match kind {
            ReportKind::UserRegistrations => {
                let users: Vec<_> = self
                    .store
                    .list_users()?
                    .into_iter()
                    .filter(|user| window.contains(user.created_at))
                    .collect();
                Report::UserRegistrations {
                    total: users.len(),
                    by_role: tally(users.iter().map(|user| user.role.label())),
                }
            }
            ReportKind::JobApplications => {
                let applications: Vec<_> = self
                    .store
                    .list_applications()?
                    .into_iter()
                    .filter(|app| window.contains(app.submitted_at))
                    .collect();
                Report::JobApplications {
                    total: applications.len(),
                    by_status: tally(applications.iter().map(|app| app.status.label())),
                }
            }
            ReportKind::CompanyActivity => {
                let mut posted: HashMap<CompanyId, usize> = HashMap::new();
                for job in self.store.list_jobs()? {
                    if window.contains(job.created_at) {
                        *posted.entry(job.company_id).or_default() += 1;
                    }
                }
                let names: HashMap<CompanyId, String> = self
                    .store
                    .list_companies()?
                    .into_iter()
                    .map(|company| (company.id, company.name))
                    .collect();
                let counts = posted
                    .into_iter()
                    .map(|(company_id, jobs_posted)| CompanyActivity {
                        company_name: names
                            .get(&company_id)
                            .cloned()
                            .unwrap_or_else(|| company_id.to_string()),
                        jobs_posted,
                    })
                    .collect();
                Report::company_activity(counts)
            }
        };

        tracing::info!(report = kind.label(), "admin report generated");
        audit::record(
            self.store.as_ref(),
            AuditEntry::new(&caller.user_id, "admin.report_generated", kind.label()),
        );
        Ok(report)
    }

    pub fn report_csv(
        &self,
        caller: &Caller,
        kind: &str,
        window: ReportWindow,
    ) -> Result<String, AdminError> {
        let report = self.report(caller, kind, window)?;
        Ok(report.to_csv()?)
    }

    /// Change one account's status. Admins cannot moderate their own account.
    pub fn manage_user(
        &self,
        caller: &Caller,
        user_id: &UserId,
        request: &UserActionRequest,
    ) -> Result<UserAccount, AdminError> {
        ensure_admin(caller)?;
        if &caller.user_id == user_id {
            return Err(AdminError::BadRequest(
                "admins cannot change their own account status".to_string(),
            ));
        }

        let mut account = self
            .store
            .fetch_user(user_id)?
            .ok_or_else(|| AdminError::NotFound(format!("user {user_id} not found")))?;
        let previous = account.status;
        account.status = request.action.resulting_status();
        self.store.save_user(account.clone())?;

        tracing::info!(
            user_id = %user_id,
            action = request.action.label(),
            from = previous.label(),
            to = account.status.label(),
            "account status changed"
        );
        let mut entry = AuditEntry::new(&caller.user_id, "admin.user_action", user_id.to_string())
            .with_detail("action", request.action.label())
            .with_detail("status", account.status.label());
        if let Some(reason) = request.reason.as_deref() {
            entry = entry.with_detail("reason", reason);
        }
        audit::record(self.store.as_ref(), entry);
        Ok(account)
    }

    /// Apply one action to many accounts, counting rather than propagating
    /// per-account failures.
    pub fn bulk_user_action(
        &self,
        caller: &Caller,
        bulk: &BulkUserAction,
    ) -> Result<BulkUserActionSummary, AdminError> {
        ensure_admin(caller)?;
        let request = UserActionRequest {
            action: bulk.action,
            reason: bulk.reason.clone(),
        };
        let mut summary = BulkUserActionSummary::default();
        for user_id in &bulk.user_ids {
            match self.manage_user(caller, user_id, &request) {
                Ok(_) => summary.updated += 1,
                Err(error) => {
                    summary.failed += 1;
                    tracing::warn!(user_id = %user_id, %error, "bulk user action skipped account");
                }
            }
        }
        Ok(summary)
    }

    pub fn audit_trail(
        &self,
        caller: &Caller,
        filter: &AuditFilter,
    ) -> Result<Vec<AuditEntry>, AdminError> {
        ensure_admin(caller)?;
        Ok(self.store.query_audit(filter)?)
    }
}

fn ensure_admin(caller: &Caller) -> Result<(), AdminError> {
    if caller.is(Role::PlatformAdmin) {
        Ok(())
    } else {
        Err(AdminError::Forbidden("admin access required".to_string()))
    }
}

fn tally<'a>(labels: impl Iterator<Item = &'a str>) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for label in labels {
        *counts.entry(label.to_string()).or_insert(0) += 1;
    }
    counts
}

#[derive(Debug, thiserror::Error)]
pub enum AdminError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("failed to render report: {0}")]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl AdminError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AdminError::NotFound(_) => ErrorKind::NotFound,
            AdminError::BadRequest(_) => ErrorKind::BadRequest,
            AdminError::Forbidden(_) => ErrorKind::Forbidden,
            AdminError::Csv(_) => ErrorKind::Internal,
            AdminError::Repository(error) => error.kind(),
        }
    }
}

impl IntoResponse for AdminError {
    fn into_response(self) -> Response {
        if matches!(self, AdminError::Csv(_)) {
            tracing::error!(error = %self, "admin report rendering failed");
        }
        error_response(self.kind(), self.to_string())
    }
}
