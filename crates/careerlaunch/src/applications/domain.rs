use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::domain::{JobId, PayPeriod};
use crate::identity::{CompanyId, UserId};

/// Identifier wrapper for applications.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ApplicationId(pub String);

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Application progression.
///
/// `submitted → under_review → shortlisted → interviewed → {accepted | rejected}`,
/// with `withdrawn` reachable by the owning student from any undecided state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Submitted,
    UnderReview,
    Shortlisted,
    Interviewed,
    Accepted,
    Rejected,
    Withdrawn,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 7] = [
        ApplicationStatus::Submitted,
        ApplicationStatus::UnderReview,
        ApplicationStatus::Shortlisted,
        ApplicationStatus::Interviewed,
        ApplicationStatus::Accepted,
        ApplicationStatus::Rejected,
        ApplicationStatus::Withdrawn,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Submitted => "submitted",
            ApplicationStatus::UnderReview => "under_review",
            ApplicationStatus::Shortlisted => "shortlisted",
            ApplicationStatus::Interviewed => "interviewed",
            ApplicationStatus::Accepted => "accepted",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::Withdrawn => "withdrawn",
        }
    }

    /// Position in the review chain. Both decisions share the last rung.
    pub const fn rank(self) -> u8 {
        match self {
            ApplicationStatus::Submitted => 0,
            ApplicationStatus::UnderReview => 1,
            ApplicationStatus::Shortlisted => 2,
            ApplicationStatus::Interviewed => 3,
            ApplicationStatus::Accepted | ApplicationStatus::Rejected => 4,
            ApplicationStatus::Withdrawn => u8::MAX,
        }
    }

    /// A recruiter decision has been recorded.
    pub const fn is_decided(self) -> bool {
        matches!(self, ApplicationStatus::Accepted | ApplicationStatus::Rejected)
    }

    /// No further transitions are possible.
    pub const fn is_terminal(self) -> bool {
        self.is_decided() || matches!(self, ApplicationStatus::Withdrawn)
    }

    /// Whether a recruiter may move an application from `self` to `target`.
    pub fn can_advance_to(self, target: ApplicationStatus) -> bool {
        !matches!(
            target,
            ApplicationStatus::Submitted | ApplicationStatus::Withdrawn
        ) && !self.is_terminal()
            && target.rank() >= self.rank()
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One entry of the append-only status history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusChange {
    pub status: ApplicationStatus,
    pub timestamp: DateTime<Utc>,
    pub actor: UserId,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InterviewFormat {
    Phone,
    Video,
    InPerson,
}

impl InterviewFormat {
    pub const fn label(self) -> &'static str {
        match self {
            InterviewFormat::Phone => "phone",
            InterviewFormat::Video => "video",
            InterviewFormat::InPerson => "in-person",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InterviewInfo {
    pub scheduled_date: Option<DateTime<Utc>>,
    pub format: Option<InterviewFormat>,
    pub location: Option<String>,
    pub interviewer_name: Option<String>,
    pub interviewer_email: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpectedSalary {
    pub amount: u32,
    pub currency: String,
    pub period: PayPeriod,
}

/// Stored application record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationRecord {
    pub id: ApplicationId,
    pub student_id: UserId,
    pub job_id: JobId,
    /// Owning company of the job at submission time, kept for scoped reads.
    pub company_id: CompanyId,
    pub status: ApplicationStatus,
    pub cover_letter: Option<String>,
    pub status_history: Vec<StatusChange>,
    pub recruiter_notes: Option<String>,
    pub interview: Option<InterviewInfo>,
    pub interview_feedback: Option<String>,
    pub rejection_reason: Option<String>,
    pub score: Option<u8>,
    pub skills_match_percentage: Option<u8>,
    pub expected_salary: Option<ExpectedSalary>,
    pub availability_date: Option<NaiveDate>,
    pub submitted_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ApplicationRecord {
    /// Append a history entry and move the record to `status`.
    pub fn record_change(
        &mut self,
        status: ApplicationStatus,
        actor: &UserId,
        notes: Option<String>,
        at: DateTime<Utc>,
    ) {
        self.status = status;
        self.updated_at = at;
        self.status_history.push(StatusChange {
            status,
            timestamp: at,
            actor: actor.clone(),
            notes,
        });
    }
}

/// Student payload for a new application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationSubmission {
    pub job_id: JobId,
    #[serde(default)]
    pub cover_letter: Option<String>,
    #[serde(default)]
    pub expected_salary: Option<ExpectedSalary>,
    #[serde(default)]
    pub availability_date: Option<NaiveDate>,
}

/// Interview details attached to a status update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InterviewSchedule {
    pub format: Option<InterviewFormat>,
    pub location: Option<String>,
    pub interviewer_name: Option<String>,
    pub interviewer_email: Option<String>,
    pub notes: Option<String>,
}

/// Recruiter or admin request to progress an application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub status: ApplicationStatus,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub interview_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub interview: Option<InterviewSchedule>,
    #[serde(default)]
    pub interview_feedback: Option<String>,
    #[serde(default)]
    pub rejection_reason: Option<String>,
    #[serde(default)]
    pub score: Option<u8>,
}

impl StatusUpdate {
    pub fn to(status: ApplicationStatus) -> Self {
        Self {
            status,
            notes: None,
            interview_date: None,
            interview: None,
            interview_feedback: None,
            rejection_reason: None,
            score: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkStatusUpdate {
    pub application_ids: Vec<ApplicationId>,
    pub status: ApplicationStatus,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkUpdateSummary {
    pub updated: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationFilters {
    pub status: Option<ApplicationStatus>,
    pub job_id: Option<JobId>,
    pub student_id: Option<UserId>,
    pub company_id: Option<CompanyId>,
    pub page: Option<usize>,
    pub limit: Option<usize>,
}

impl ApplicationFilters {
    pub fn matches(&self, record: &ApplicationRecord) -> bool {
        self.status.map_or(true, |status| record.status == status)
            && self.job_id.as_ref().map_or(true, |id| &record.job_id == id)
            && self
                .student_id
                .as_ref()
                .map_or(true, |id| &record.student_id == id)
            && self
                .company_id
                .as_ref()
                .map_or(true, |id| &record.company_id == id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationStats {
    pub total: usize,
    pub by_status: BTreeMap<String, usize>,
    /// Applications submitted during the last seven days.
    pub recent: usize,
}
