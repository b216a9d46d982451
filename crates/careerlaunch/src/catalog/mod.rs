//! Job postings: publication lifecycle, search, and recommendations.

pub mod domain;
pub mod matching;
pub mod repository;
pub mod router;
pub mod search;
pub mod service;
pub mod stats;

#[cfg(test)]
mod tests;

pub use domain::{
    ExperienceLevel, Job, JobChanges, JobDraft, JobId, JobStatus, JobType, JobView, PayPeriod,
    SalaryRange,
};
pub use repository::JobRepository;
pub use router::catalog_router;
pub use search::{JobSearchFilters, JobSortKey, SortOrder};
pub use service::{CatalogError, CatalogStore, JobCatalogService};
pub use stats::JobStats;
