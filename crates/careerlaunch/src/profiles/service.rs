use std::sync::Arc;

use axum::response::{IntoResponse, Response};

use super::domain::{
    CompanyChanges, CompanyDraft, CompanySearch, PreferenceChanges, RecruiterLink,
    StudentProfileChanges, VerificationDecision,
};
use crate::audit::{self, AuditEntry, AuditLog};
use crate::catalog::matching::contains_ignore_case;
use crate::error::{error_response, ErrorKind};
use crate::identity::{
    AccountStatus, Caller, Company, CompanyId, DirectoryRepository, RecruiterProfile, Role,
    StudentProfile, StudentRepository, UserAccount, UserId, VerificationStatus,
};
use crate::repository::{IdSequence, Page, PageRequest, RepositoryError};

static COMPANY_SEQUENCE: IdSequence = IdSequence::new("co");

/// Storage behind profile and employer management.
pub trait ProfileStore: DirectoryRepository + StudentRepository + AuditLog {}

impl<T> ProfileStore for T where T: DirectoryRepository + StudentRepository + AuditLog {}

/// Student records, employer records, and the caller's own account state.
pub struct ProfileService<S> {
    store: Arc<S>,
}

impl<S> ProfileService<S>
where
    S: ProfileStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn student_profile(&self, caller: &Caller) -> Result<StudentProfile, ProfileError> {
        ensure_role(caller, Role::Student, "only students have a student profile")?;
        self.load_student(&caller.user_id)
    }

    pub fn update_student_profile(
        &self,
        caller: &Caller,
        changes: StudentProfileChanges,
    ) -> Result<StudentProfile, ProfileError> {
        ensure_role(caller, Role::Student, "only students have a student profile")?;
        let mut profile = self.load_student(&caller.user_id)?;
        changes
            .apply(&mut profile)
            .map_err(ProfileError::BadRequest)?;
        self.store.save_student(profile.clone())?;

        tracing::info!(student_id = %caller.user_id, skills = profile.skills.len(), "student profile updated");
        audit::record(
            self.store.as_ref(),
            AuditEntry::new(&caller.user_id, "student.profile_updated", caller.user_id.to_string()),
        );
        Ok(profile)
    }

    /// Merge `changes` over the stored preferences; recommendations read them on the next call.
    pub fn update_preferences(
        &self,
        caller: &Caller,
        changes: PreferenceChanges,
    ) -> Result<StudentProfile, ProfileError> {
        ensure_role(caller, Role::Student, "only students have job preferences")?;
        let mut profile = self.load_student(&caller.user_id)?;
        changes
            .merge_into(&mut profile.preferences)
            .map_err(ProfileError::BadRequest)?;
        self.store.save_student(profile.clone())?;

        tracing::info!(student_id = %caller.user_id, "job preferences updated");
        audit::record(
            self.store.as_ref(),
            AuditEntry::new(
                &caller.user_id,
                "student.preferences_updated",
                caller.user_id.to_string(),
            )
            .with_detail("remote_work", profile.preferences.remote_work.to_string()),
        );
        Ok(profile)
    }

    /// Register an employer.
    ///
    /// Platform admins create verified companies. A recruiter without an
    /// employer creates a pending company and is linked to it.
    pub fn create_company(
        &self,
        caller: &Caller,
        draft: CompanyDraft,
    ) -> Result<Company, ProfileError> {
        let verification = match caller.role {
            Role::PlatformAdmin => VerificationStatus::Verified,
            Role::Recruiter => {
                if let Some(link) = self.store.fetch_recruiter(&caller.user_id)? {
                    return Err(ProfileError::BadRequest(format!(
                        "recruiter already belongs to company {}",
                        link.company_id
                    )));
                }
                VerificationStatus::Pending
            }
            _ => {
                return Err(ProfileError::Forbidden(
                    "only recruiters and platform admins can register companies".to_string(),
                ))
            }
        };
        let position = draft.position.clone();
        let company = draft
            .into_company(COMPANY_SEQUENCE.next_id(), verification)
            .map_err(ProfileError::BadRequest)?;
        self.store.save_company(company.clone())?;

        if caller.is(Role::Recruiter) {
            self.store.save_recruiter(RecruiterProfile {
                user_id: caller.user_id.clone(),
                company_id: company.id.clone(),
                position,
            })?;
        }

        tracing::info!(company_id = %company.id, verification = company.verification.label(), "company registered");
        audit::record(
            self.store.as_ref(),
            AuditEntry::new(&caller.user_id, "company.created", company.id.to_string())
                .with_detail("verification", company.verification.label()),
        );
        Ok(company)
    }

    pub fn get_company(&self, company_id: &CompanyId) -> Result<Company, ProfileError> {
        self.store
            .fetch_company(company_id)?
            .ok_or_else(|| ProfileError::NotFound(format!("company {company_id} not found")))
    }

    /// Verified companies matching every populated filter, ordered by name.
    pub fn search_companies(&self, query: &CompanySearch) -> Result<Page<Company>, ProfileError> {
        let mut companies: Vec<Company> = self
            .store
            .list_companies()?
            .into_iter()
            .filter(|company| company.verification == VerificationStatus::Verified)
            .filter(|company| {
                query.q.as_deref().map_or(true, |q| {
                    contains_ignore_case(&company.name, q)
                        || company
                            .description
                            .as_deref()
                            .is_some_and(|description| contains_ignore_case(description, q))
                })
            })
            .filter(|company| optional_match(company.industry.as_deref(), query.industry.as_deref()))
            .filter(|company| optional_match(company.location.as_deref(), query.location.as_deref()))
            .collect();
        companies.sort_by(|a, b| {
            a.name
                .to_lowercase()
                .cmp(&b.name.to_lowercase())
                .then_with(|| a.id.0.cmp(&b.id.0))
        });
        Ok(Page::slice(
            companies,
            PageRequest::new(query.page, query.limit),
        ))
    }

    /// Edit an employer record; limited to its own recruiters and platform admins.
    pub fn update_company(
        &self,
        caller: &Caller,
        company_id: &CompanyId,
        changes: CompanyChanges,
    ) -> Result<Company, ProfileError> {
        let mut company = self.get_company(company_id)?;
        if !caller.is(Role::PlatformAdmin) {
            let owns = caller.is(Role::Recruiter)
                && self
                    .store
                    .fetch_recruiter(&caller.user_id)?
                    .is_some_and(|link| &link.company_id == company_id);
            if !owns {
                return Err(ProfileError::Forbidden(
                    "you can only update your own company".to_string(),
                ));
            }
        }
        changes
            .apply(&mut company)
            .map_err(ProfileError::BadRequest)?;
        self.store.save_company(company.clone())?;

        tracing::info!(company_id = %company.id, "company updated");
        audit::record(
            self.store.as_ref(),
            AuditEntry::new(&caller.user_id, "company.updated", company.id.to_string()),
        );
        Ok(company)
    }

    pub fn verify_company(
        &self,
        caller: &Caller,
        company_id: &CompanyId,
        decision: VerificationDecision,
    ) -> Result<Company, ProfileError> {
        ensure_role(
            caller,
            Role::PlatformAdmin,
            "only platform admins can verify companies",
        )?;
        let mut company = self.get_company(company_id)?;
        let previous = company.verification;
        company.verification = decision.status;
        self.store.save_company(company.clone())?;

        tracing::info!(
            company_id = %company.id,
            from = previous.label(),
            to = company.verification.label(),
            "company verification changed"
        );
        audit::record(
            self.store.as_ref(),
            AuditEntry::new(&caller.user_id, "company.verification", company.id.to_string())
                .with_detail("from", previous.label())
                .with_detail("to", company.verification.label()),
        );
        Ok(company)
    }

    /// Attach a recruiter account to an employer, replacing any earlier link.
    pub fn link_recruiter(
        &self,
        caller: &Caller,
        recruiter_id: &UserId,
        link: RecruiterLink,
    ) -> Result<RecruiterProfile, ProfileError> {
        ensure_role(
            caller,
            Role::PlatformAdmin,
            "only platform admins can link recruiters to companies",
        )?;
        let account = self
            .store
            .fetch_user(recruiter_id)?
            .ok_or_else(|| ProfileError::NotFound(format!("user {recruiter_id} not found")))?;
        if account.role != Role::Recruiter {
            return Err(ProfileError::BadRequest(format!(
                "user {recruiter_id} is a {}, not a recruiter",
                account.role.label()
            )));
        }
        let company = self.get_company(&link.company_id)?;
        let previous = self
            .store
            .fetch_recruiter(recruiter_id)?
            .map(|profile| profile.company_id);

        let profile = RecruiterProfile {
            user_id: recruiter_id.clone(),
            company_id: company.id.clone(),
            position: link.position,
        };
        self.store.save_recruiter(profile.clone())?;

        tracing::info!(recruiter_id = %recruiter_id, company_id = %company.id, "recruiter linked to company");
        let mut entry = AuditEntry::new(&caller.user_id, "recruiter.linked", recruiter_id.to_string())
            .with_detail("company_id", company.id.to_string());
        if let Some(previous) = previous {
            entry = entry.with_detail("previous_company_id", previous.to_string());
        }
        audit::record(self.store.as_ref(), entry);
        Ok(profile)
    }

    pub fn deactivate_account(&self, caller: &Caller) -> Result<UserAccount, ProfileError> {
        let mut account = self.load_account(&caller.user_id)?;
        account.status = AccountStatus::Deactivated;
        self.store.save_user(account.clone())?;

        tracing::info!(user_id = %caller.user_id, "account deactivated by its owner");
        audit::record(
            self.store.as_ref(),
            AuditEntry::new(&caller.user_id, "account.deactivated", caller.user_id.to_string()),
        );
        Ok(account)
    }

    /// Reopen a self-deactivated account. Suspensions are lifted by admins only.
    pub fn reactivate_account(&self, caller: &Caller) -> Result<UserAccount, ProfileError> {
        let mut account = self.load_account(&caller.user_id)?;
        if account.status == AccountStatus::Suspended {
            return Err(ProfileError::Forbidden(
                "suspended accounts can only be reactivated by an administrator".to_string(),
            ));
        }
        account.status = AccountStatus::Active;
        self.store.save_user(account.clone())?;

        tracing::info!(user_id = %caller.user_id, "account reactivated by its owner");
        audit::record(
            self.store.as_ref(),
            AuditEntry::new(&caller.user_id, "account.reactivated", caller.user_id.to_string()),
        );
        Ok(account)
    }

    fn load_student(&self, user_id: &UserId) -> Result<StudentProfile, ProfileError> {
        self.store
            .fetch_student(user_id)?
            .ok_or_else(|| ProfileError::NotFound(format!("student profile {user_id} not found")))
    }

    fn load_account(&self, user_id: &UserId) -> Result<UserAccount, ProfileError> {
        self.store
            .fetch_user(user_id)?
            .ok_or_else(|| ProfileError::NotFound(format!("user {user_id} not found")))
    }
}

fn ensure_role(caller: &Caller, role: Role, message: &str) -> Result<(), ProfileError> {
    if caller.is(role) {
        Ok(())
    } else {
        Err(ProfileError::Forbidden(message.to_string()))
    }
}

fn optional_match(value: Option<&str>, wanted: Option<&str>) -> bool {
    match wanted {
        Some(wanted) => value.is_some_and(|value| contains_ignore_case(value, wanted)),
        None => true,
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Forbidden(String),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl ProfileError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ProfileError::NotFound(_) => ErrorKind::NotFound,
            ProfileError::BadRequest(_) => ErrorKind::BadRequest,
            ProfileError::Forbidden(_) => ErrorKind::Forbidden,
            ProfileError::Repository(error) => error.kind(),
        }
    }
}

impl IntoResponse for ProfileError {
    fn into_response(self) -> Response {
        error_response(self.kind(), self.to_string())
    }
}
