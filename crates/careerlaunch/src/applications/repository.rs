use super::domain::{ApplicationId, ApplicationRecord};
use crate::catalog::domain::JobId;
use crate::identity::UserId;
use crate::repository::RepositoryError;

/// Storage abstraction for application records.
///
/// Implementations must reject a second record for the same (student, job)
/// pair with [`RepositoryError::Conflict`].
pub trait ApplicationRepository: Send + Sync {
    fn insert_application(
        &self,
        record: ApplicationRecord,
    ) -> Result<ApplicationRecord, RepositoryError>;
    fn update_application(&self, record: ApplicationRecord) -> Result<(), RepositoryError>;
    fn fetch_application(
        &self,
        id: &ApplicationId,
    ) -> Result<Option<ApplicationRecord>, RepositoryError>;
    fn find_application_for(
        &self,
        student_id: &UserId,
        job_id: &JobId,
    ) -> Result<Option<ApplicationRecord>, RepositoryError>;
    fn list_applications(&self) -> Result<Vec<ApplicationRecord>, RepositoryError>;
    fn count_applications_for_job(&self, job_id: &JobId) -> Result<usize, RepositoryError>;
}
