use super::domain::{Job, JobId};
use crate::repository::RepositoryError;

/// Storage abstraction for job postings.
pub trait JobRepository: Send + Sync {
    fn insert_job(&self, job: Job) -> Result<Job, RepositoryError>;
    fn update_job(&self, job: Job) -> Result<(), RepositoryError>;
    fn remove_job(&self, id: &JobId) -> Result<(), RepositoryError>;
    fn fetch_job(&self, id: &JobId) -> Result<Option<Job>, RepositoryError>;
    fn list_jobs(&self) -> Result<Vec<Job>, RepositoryError>;
    /// Bump the derived application counter in a single storage operation,
    /// returning the new value.
    fn increment_application_count(&self, id: &JobId) -> Result<u64, RepositoryError>;
}
