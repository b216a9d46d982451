use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::catalog::domain::JobType;
use crate::identity::{Company, CompanyId, JobPreferences, StudentProfile, VerificationStatus};

pub const MAX_GPA: f32 = 4.0;

/// Partial update of a student's academic record; absent fields are kept.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StudentProfileChanges {
    #[serde(default)]
    pub skills: Option<BTreeSet<String>>,
    #[serde(default)]
    pub programming_languages: Option<BTreeSet<String>>,
    #[serde(default)]
    pub resume_url: Option<String>,
    #[serde(default)]
    pub gpa: Option<f32>,
    #[serde(default)]
    pub graduation_year: Option<u16>,
    #[serde(default)]
    pub major: Option<String>,
}

impl StudentProfileChanges {
    pub fn apply(self, profile: &mut StudentProfile) -> Result<(), String> {
        if let Some(gpa) = self.gpa {
            if !(0.0..=MAX_GPA).contains(&gpa) {
                return Err(format!("gpa must be between 0 and {MAX_GPA}"));
            }
            profile.gpa = Some(gpa);
        }
        if let Some(skills) = self.skills {
            profile.skills = tidy(skills);
        }
        if let Some(languages) = self.programming_languages {
            profile.programming_languages = languages
                .into_iter()
                .map(|language| language.trim().to_string())
                .filter(|language| !language.is_empty())
                .collect();
        }
        if let Some(resume_url) = self.resume_url {
            profile.resume_url = Some(resume_url);
        }
        if let Some(year) = self.graduation_year {
            profile.graduation_year = Some(year);
        }
        if let Some(major) = self.major {
            profile.major = Some(major);
        }
        Ok(())
    }
}

fn tidy(skills: BTreeSet<String>) -> BTreeSet<String> {
    skills
        .into_iter()
        .map(|skill| skill.trim().to_lowercase())
        .filter(|skill| !skill.is_empty())
        .collect()
}

/// Job preference fields merged over the stored preferences.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PreferenceChanges {
    #[serde(default)]
    pub job_types: Option<Vec<JobType>>,
    #[serde(default)]
    pub locations: Option<Vec<String>>,
    #[serde(default)]
    pub remote_work: Option<bool>,
    #[serde(default)]
    pub industries: Option<Vec<String>>,
    #[serde(default)]
    pub salary_min: Option<u32>,
    #[serde(default)]
    pub salary_max: Option<u32>,
}

impl PreferenceChanges {
    /// Merge into `preferences`, leaving them untouched if the result is inconsistent.
    pub fn merge_into(self, preferences: &mut JobPreferences) -> Result<(), String> {
        let mut merged = preferences.clone();
        if let Some(job_types) = self.job_types {
            merged.job_types = job_types;
        }
        if let Some(locations) = self.locations {
            merged.locations = locations;
        }
        if let Some(remote_work) = self.remote_work {
            merged.remote_work = remote_work;
        }
        if let Some(industries) = self.industries {
            merged.industries = industries;
        }
        if self.salary_min.is_some() {
            merged.salary_min = self.salary_min;
        }
        if self.salary_max.is_some() {
            merged.salary_max = self.salary_max;
        }
        if let (Some(min), Some(max)) = (merged.salary_min, merged.salary_max) {
            if min > max {
                return Err("preferred salary minimum exceeds maximum".to_string());
            }
        }
        *preferences = merged;
        Ok(())
    }
}

/// Employer registration payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyDraft {
    pub name: String,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    /// Title recorded on the creating recruiter's link.
    #[serde(default)]
    pub position: Option<String>,
}

impl CompanyDraft {
    pub fn into_company(self, id: String, verification: VerificationStatus) -> Result<Company, String> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err("company name must not be empty".to_string());
        }
        let mut company = Company::new(id, name);
        company.industry = self.industry;
        company.location = self.location;
        company.description = self.description;
        company.website = self.website;
        company.verification = verification;
        Ok(company)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyChanges {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
}

impl CompanyChanges {
    pub fn apply(self, company: &mut Company) -> Result<(), String> {
        if let Some(name) = self.name {
            let name = name.trim();
            if name.is_empty() {
                return Err("company name must not be empty".to_string());
            }
            company.name = name.to_string();
        }
        if self.industry.is_some() {
            company.industry = self.industry;
        }
        if self.location.is_some() {
            company.location = self.location;
        }
        if self.description.is_some() {
            company.description = self.description;
        }
        if self.website.is_some() {
            company.website = self.website;
        }
        Ok(())
    }
}

/// Directory query over verified employers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanySearch {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub page: Option<usize>,
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecruiterLink {
    pub company_id: CompanyId,
    #[serde(default)]
    pub position: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationDecision {
    pub status: VerificationStatus,
}
