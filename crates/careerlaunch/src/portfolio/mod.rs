//! Student portfolios, their projects, and sync against a code-hosting provider.

pub mod domain;
pub mod provider;
pub mod repository;
pub mod router;
pub mod service;
pub mod skills;

#[cfg(test)]
mod tests;

pub use domain::{
    Platform, Portfolio, PortfolioChanges, PortfolioDraft, PortfolioId, PortfolioSearch,
    PortfolioStatistics, Project, ProjectChanges, ProjectDraft, ProjectId, ProjectStatus,
    SyncReport, SyncRequest, SyncState, SyncStatus,
};
pub use provider::{
    GitHubProvider, ProviderError, ProviderProfile, ProviderRepository, RepositoryLicense,
    RepositoryProvider,
};
pub use repository::PortfolioRepository;
pub use router::portfolio_router;
pub use service::{PortfolioError, PortfolioService, PortfolioStore};
pub use skills::extract_skills;
