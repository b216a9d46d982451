use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identity::{Company, CompanyId, UserId};

/// Identifier wrapper for job postings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct JobId(pub String);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Publication lifecycle of a posting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Draft,
    Active,
    Paused,
    Closed,
}

impl JobStatus {
    pub const ALL: [JobStatus; 4] = [
        JobStatus::Draft,
        JobStatus::Active,
        JobStatus::Paused,
        JobStatus::Closed,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            JobStatus::Draft => "draft",
            JobStatus::Active => "active",
            JobStatus::Paused => "paused",
            JobStatus::Closed => "closed",
        }
    }

    pub const fn can_publish(self) -> bool {
        matches!(self, JobStatus::Draft | JobStatus::Paused)
    }

    pub const fn can_pause(self) -> bool {
        matches!(self, JobStatus::Active)
    }

    pub const fn is_closed(self) -> bool {
        matches!(self, JobStatus::Closed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobType {
    FullTime,
    PartTime,
    Internship,
    Contract,
    Freelance,
}

impl JobType {
    pub const fn label(self) -> &'static str {
        match self {
            JobType::FullTime => "full_time",
            JobType::PartTime => "part_time",
            JobType::Internship => "internship",
            JobType::Contract => "contract",
            JobType::Freelance => "freelance",
        }
    }
}

impl Default for JobType {
    fn default() -> Self {
        JobType::FullTime
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExperienceLevel {
    Entry,
    Junior,
    Mid,
    Senior,
}

impl Default for ExperienceLevel {
    fn default() -> Self {
        ExperienceLevel::Entry
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayPeriod {
    Hourly,
    Monthly,
    Annually,
}

/// Advertised compensation; either bound may be omitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryRange {
    pub min: Option<u32>,
    pub max: Option<u32>,
    pub currency: String,
    pub period: Option<PayPeriod>,
}

impl SalaryRange {
    pub fn is_consistent(&self) -> bool {
        match (self.min, self.max) {
            (Some(min), Some(max)) => min <= max,
            _ => true,
        }
    }
}

/// A posting owned by one company and the recruiter who created it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub title: String,
    pub description: String,
    pub requirements: Vec<String>,
    pub skills_required: BTreeSet<String>,
    pub experience_level: ExperienceLevel,
    pub job_type: JobType,
    pub salary: Option<SalaryRange>,
    pub location: Option<String>,
    pub is_remote: bool,
    pub is_hybrid: bool,
    pub status: JobStatus,
    pub deadline: Option<DateTime<Utc>>,
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub benefits: Vec<String>,
    pub positions: u32,
    pub application_count: u64,
    pub is_featured: bool,
    pub company_id: CompanyId,
    pub recruiter_id: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub published_at: Option<DateTime<Utc>>,
    pub closed_at: Option<DateTime<Utc>>,
}

impl Job {
    /// Remote filters treat hybrid roles as remote friendly.
    pub fn allows_remote(&self) -> bool {
        self.is_remote || self.is_hybrid
    }

    pub fn deadline_passed(&self, now: DateTime<Utc>) -> bool {
        self.deadline.is_some_and(|deadline| deadline <= now)
    }

    pub fn is_owned_by(&self, recruiter_id: &UserId) -> bool {
        &self.recruiter_id == recruiter_id
    }

    pub fn view(self, company: Option<Company>) -> JobView {
        JobView { job: self, company }
    }
}

/// API representation of a job with its company resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobView {
    #[serde(flatten)]
    pub job: Job,
    pub company: Option<Company>,
}

fn default_positions() -> u32 {
    1
}

/// Recruiter supplied payload for a new posting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobDraft {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub requirements: Vec<String>,
    #[serde(default)]
    pub skills_required: BTreeSet<String>,
    #[serde(default)]
    pub experience_level: ExperienceLevel,
    #[serde(default)]
    pub job_type: JobType,
    #[serde(default)]
    pub salary: Option<SalaryRange>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub is_remote: bool,
    #[serde(default)]
    pub is_hybrid: bool,
    #[serde(default)]
    pub deadline: Option<DateTime<Utc>>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub benefits: Vec<String>,
    #[serde(default = "default_positions")]
    pub positions: u32,
    #[serde(default)]
    pub is_featured: bool,
    /// Store the posting as a draft instead of publishing it immediately.
    #[serde(default)]
    pub draft: bool,
}

impl JobDraft {
    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("job title must not be empty".to_string());
        }
        if self.description.trim().is_empty() {
            return Err("job description must not be empty".to_string());
        }
        if self.positions == 0 {
            return Err("a job must offer at least one position".to_string());
        }
        if let Some(salary) = &self.salary {
            if !salary.is_consistent() {
                return Err("salary minimum exceeds maximum".to_string());
            }
        }
        Ok(())
    }
}

/// Partial update applied by the owning recruiter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub requirements: Option<Vec<String>>,
    pub skills_required: Option<BTreeSet<String>>,
    pub experience_level: Option<ExperienceLevel>,
    pub job_type: Option<JobType>,
    pub salary: Option<SalaryRange>,
    pub location: Option<String>,
    pub is_remote: Option<bool>,
    pub is_hybrid: Option<bool>,
    pub deadline: Option<DateTime<Utc>>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
    pub benefits: Option<Vec<String>>,
    pub positions: Option<u32>,
    pub is_featured: Option<bool>,
}

impl JobChanges {
    pub fn apply(self, job: &mut Job) -> Result<(), String> {
        if let Some(title) = self.title {
            if title.trim().is_empty() {
                return Err("job title must not be empty".to_string());
            }
            job.title = title;
        }
        if let Some(description) = self.description {
            job.description = description;
        }
        if let Some(requirements) = self.requirements {
            job.requirements = requirements;
        }
        if let Some(skills) = self.skills_required {
            job.skills_required = skills;
        }
        if let Some(level) = self.experience_level {
            job.experience_level = level;
        }
        if let Some(job_type) = self.job_type {
            job.job_type = job_type;
        }
        if let Some(salary) = self.salary {
            if !salary.is_consistent() {
                return Err("salary minimum exceeds maximum".to_string());
            }
            job.salary = Some(salary);
        }
        if let Some(location) = self.location {
            job.location = Some(location);
        }
        if let Some(remote) = self.is_remote {
            job.is_remote = remote;
        }
        if let Some(hybrid) = self.is_hybrid {
            job.is_hybrid = hybrid;
        }
        if let Some(deadline) = self.deadline {
            job.deadline = Some(deadline);
        }
        if let Some(category) = self.category {
            job.category = Some(category);
        }
        if let Some(tags) = self.tags {
            job.tags = tags;
        }
        if let Some(benefits) = self.benefits {
            job.benefits = benefits;
        }
        if let Some(positions) = self.positions {
            if positions == 0 {
                return Err("a job must offer at least one position".to_string());
            }
            job.positions = positions;
        }
        if let Some(featured) = self.is_featured {
            job.is_featured = featured;
        }
        Ok(())
    }
}
