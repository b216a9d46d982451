//! Caller identity, user accounts, and role extension records.
//!
//! Authentication happens upstream; the gateway forwards the resolved user id
//! and role as trusted headers and this module turns them into a [`Caller`].
//! Every account carries an explicit [`Role`] tag, and role specific data
//! lives in separate records keyed by the same [`UserId`].

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::response::Response;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::domain::JobType;
use crate::error::{error_response, ErrorKind};
use crate::repository::RepositoryError;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_ROLE_HEADER: &str = "x-user-role";

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub String);

impl UserId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CompanyId(pub String);

impl fmt::Display for CompanyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Role tag stored on every account and resolved once at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Student,
    Recruiter,
    UniversityAdmin,
    PlatformAdmin,
}

impl Role {
    pub const ALL: [Role; 4] = [
        Role::Student,
        Role::Recruiter,
        Role::UniversityAdmin,
        Role::PlatformAdmin,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Recruiter => "recruiter",
            Role::UniversityAdmin => "university_admin",
            Role::PlatformAdmin => "platform_admin",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role '{0}'")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        Role::ALL
            .into_iter()
            .find(|role| role.label() == normalized)
            .ok_or_else(|| UnknownRole(value.to_string()))
    }
}

/// The authenticated principal attached to a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub user_id: UserId,
    pub role: Role,
}

impl Caller {
    pub fn new(user_id: impl Into<String>, role: Role) -> Self {
        Self {
            user_id: UserId(user_id.into()),
            role,
        }
    }

    pub fn is(&self, role: Role) -> bool {
        self.role == role
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = header_value(parts, USER_ID_HEADER)?;
        let role = header_value(parts, USER_ROLE_HEADER)?
            .parse::<Role>()
            .map_err(|err| error_response(ErrorKind::Unauthorized, err.to_string()))?;

        Ok(Caller {
            user_id: UserId(user_id),
            role,
        })
    }
}

fn header_value(parts: &Parts, name: &str) -> Result<String, Response> {
    parts
        .headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .ok_or_else(|| {
            error_response(
                ErrorKind::Unauthorized,
                format!("missing or invalid {name} header"),
            )
        })
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountStatus {
    #[default]
    Active,
    Suspended,
    Deactivated,
}

impl AccountStatus {
    pub const fn label(self) -> &'static str {
        match self {
            AccountStatus::Active => "active",
            AccountStatus::Suspended => "suspended",
            AccountStatus::Deactivated => "deactivated",
        }
    }
}

/// Base identity shared by every role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserAccount {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(default)]
    pub status: AccountStatus,
    pub created_at: DateTime<Utc>,
}

/// Student extension record.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StudentProfile {
    pub user_id: UserId,
    pub skills: BTreeSet<String>,
    pub programming_languages: BTreeSet<String>,
    pub preferences: JobPreferences,
    pub resume_url: Option<String>,
    pub gpa: Option<f32>,
    pub graduation_year: Option<u16>,
    pub major: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct JobPreferences {
    #[serde(default)]
    pub job_types: Vec<JobType>,
    #[serde(default)]
    pub locations: Vec<String>,
    #[serde(default)]
    pub remote_work: bool,
    #[serde(default)]
    pub industries: Vec<String>,
    #[serde(default)]
    pub salary_min: Option<u32>,
    #[serde(default)]
    pub salary_max: Option<u32>,
}

/// Recruiter extension record linking the account to its employer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecruiterProfile {
    pub user_id: UserId,
    pub company_id: CompanyId,
    pub position: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    #[default]
    Pending,
    Verified,
    Rejected,
}

impl VerificationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            VerificationStatus::Pending => "pending",
            VerificationStatus::Verified => "verified",
            VerificationStatus::Rejected => "rejected",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    pub id: CompanyId,
    pub name: String,
    pub industry: Option<String>,
    pub location: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub verification: VerificationStatus,
}

impl Company {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: CompanyId(id.into()),
            name: name.into(),
            industry: None,
            location: None,
            description: None,
            website: None,
            verification: VerificationStatus::Verified,
        }
    }
}

/// Accounts, recruiter links, and companies.
pub trait DirectoryRepository: Send + Sync {
    fn fetch_user(&self, id: &UserId) -> Result<Option<UserAccount>, RepositoryError>;
    fn list_users(&self) -> Result<Vec<UserAccount>, RepositoryError>;
    fn save_user(&self, user: UserAccount) -> Result<(), RepositoryError>;
    fn fetch_recruiter(&self, id: &UserId) -> Result<Option<RecruiterProfile>, RepositoryError>;
    fn save_recruiter(&self, profile: RecruiterProfile) -> Result<(), RepositoryError>;
    fn fetch_company(&self, id: &CompanyId) -> Result<Option<Company>, RepositoryError>;
    fn list_companies(&self) -> Result<Vec<Company>, RepositoryError>;
    fn save_company(&self, company: Company) -> Result<(), RepositoryError>;
}

/// Student extension storage.
pub trait StudentRepository: Send + Sync {
    fn fetch_student(&self, id: &UserId) -> Result<Option<StudentProfile>, RepositoryError>;
    fn save_student(&self, profile: StudentProfile) -> Result<(), RepositoryError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{Request, StatusCode};

    fn parts_with(headers: &[(&str, &str)]) -> Parts {
        let mut builder = Request::builder().uri("/");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        let (parts, _) = builder.body(()).expect("request builds").into_parts();
        parts
    }

    #[test]
    fn role_labels_round_trip_through_from_str() {
        for role in Role::ALL {
            assert_eq!(role.label().parse::<Role>(), Ok(role));
        }
        assert_eq!("  Platform_Admin ".parse::<Role>(), Ok(Role::PlatformAdmin));
        assert!("founder".parse::<Role>().is_err());
    }

    #[tokio::test]
    async fn extracts_caller_from_trusted_headers() {
        let mut parts = parts_with(&[(USER_ID_HEADER, "stu-1"), (USER_ROLE_HEADER, "student")]);
        let caller = Caller::from_request_parts(&mut parts, &())
            .await
            .expect("caller extracted");
        assert_eq!(caller, Caller::new("stu-1", Role::Student));
    }

    #[tokio::test]
    async fn rejects_missing_or_unknown_role() {
        let mut parts = parts_with(&[(USER_ID_HEADER, "stu-1")]);
        let rejection = Caller::from_request_parts(&mut parts, &())
            .await
            .expect_err("role header required");
        assert_eq!(rejection.status(), StatusCode::UNAUTHORIZED);

        let mut parts = parts_with(&[(USER_ID_HEADER, "stu-1"), (USER_ROLE_HEADER, "guest")]);
        let rejection = Caller::from_request_parts(&mut parts, &())
            .await
            .expect_err("unknown role rejected");
        assert_eq!(rejection.status(), StatusCode::UNAUTHORIZED);
    }
}
