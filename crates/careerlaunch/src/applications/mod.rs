//! Application submission, status progression, and role-scoped reads.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    ApplicationFilters, ApplicationId, ApplicationRecord, ApplicationStats, ApplicationStatus,
    ApplicationSubmission, BulkStatusUpdate, BulkUpdateSummary, ExpectedSalary, InterviewFormat,
    InterviewInfo, InterviewSchedule, StatusChange, StatusUpdate,
};
pub use repository::ApplicationRepository;
pub use router::application_router;
pub use service::{ApplicationScope, ApplicationService, ApplicationServiceError, ApplicationStore};
