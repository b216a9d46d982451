//! Student profiles, employer records, recruiter links, and self-service account state.

pub mod domain;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    CompanyChanges, CompanyDraft, CompanySearch, PreferenceChanges, RecruiterLink,
    StudentProfileChanges, VerificationDecision,
};
pub use router::profile_router;
pub use service::{ProfileError, ProfileService, ProfileStore};
