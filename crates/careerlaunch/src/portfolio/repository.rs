use super::domain::{Portfolio, PortfolioId, Project, ProjectId};
use crate::repository::RepositoryError;

/// Storage abstraction for portfolios and the projects they own.
///
/// Implementations keep one portfolio per (student, platform) pair, one
/// project per (portfolio, repository URL) pair, and drop a portfolio's
/// projects together with it.
pub trait PortfolioRepository: Send + Sync {
    fn insert_portfolio(&self, portfolio: Portfolio) -> Result<Portfolio, RepositoryError>;
    fn update_portfolio(&self, portfolio: Portfolio) -> Result<(), RepositoryError>;
    fn remove_portfolio(&self, id: &PortfolioId) -> Result<(), RepositoryError>;
    fn fetch_portfolio(&self, id: &PortfolioId) -> Result<Option<Portfolio>, RepositoryError>;
    fn list_portfolios(&self) -> Result<Vec<Portfolio>, RepositoryError>;

    fn insert_project(&self, project: Project) -> Result<Project, RepositoryError>;
    fn update_project(&self, project: Project) -> Result<(), RepositoryError>;
    fn remove_project(&self, id: &ProjectId) -> Result<(), RepositoryError>;
    fn fetch_project(&self, id: &ProjectId) -> Result<Option<Project>, RepositoryError>;
    fn list_projects(&self, portfolio_id: &PortfolioId) -> Result<Vec<Project>, RepositoryError>;
    fn find_project_by_repository(
        &self,
        portfolio_id: &PortfolioId,
        repository_url: &str,
    ) -> Result<Option<Project>, RepositoryError>;
}
