//! Skill and preference heuristics shared by search, recommendations, and
//! application intake. Matching is case-insensitive substring and set overlap;
//! there is no relevance scoring.

use std::collections::{BTreeSet, HashSet};

use super::domain::{Job, JobId, JobStatus};
use crate::identity::{Company, StudentProfile};

pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn normalized(skills: impl IntoIterator<Item = impl AsRef<str>>) -> HashSet<String> {
    skills
        .into_iter()
        .map(|skill| skill.as_ref().trim().to_lowercase())
        .filter(|skill| !skill.is_empty())
        .collect()
}

/// Non-empty intersection between a posting's required skills and `skills`.
pub fn shares_skill(required: &BTreeSet<String>, skills: &[String]) -> bool {
    let wanted = normalized(skills);
    normalized(required).iter().any(|skill| wanted.contains(skill))
}

/// Share of the job's required skills the student already declares, as a
/// whole percentage. `None` when the job lists no skills.
pub fn skills_match_percentage(job: &Job, student: &StudentProfile) -> Option<u8> {
    let required = normalized(&job.skills_required);
    if required.is_empty() {
        return None;
    }
    let declared = normalized(&student.skills);
    let matched = required.iter().filter(|skill| declared.contains(*skill)).count();
    let percentage = (matched * 100 + required.len() / 2) / required.len();
    Some(percentage.min(100) as u8)
}

/// Candidate filter behind job recommendations.
pub struct RecommendationFilter<'a> {
    student: &'a StudentProfile,
    skills: Vec<String>,
    applied: &'a HashSet<JobId>,
}

impl<'a> RecommendationFilter<'a> {
    pub fn new(student: &'a StudentProfile, applied: &'a HashSet<JobId>) -> Self {
        let skills = student
            .skills
            .iter()
            .map(|skill| skill.trim().to_string())
            .filter(|skill| !skill.is_empty())
            .collect();
        Self {
            student,
            skills,
            applied,
        }
    }

    pub fn accepts(&self, job: &Job, company: Option<&Company>) -> bool {
        job.status == JobStatus::Active
            && !self.applied.contains(&job.id)
            && self.skill_match(job)
            && self.preference_match(job, company)
    }

    /// A student without declared skills sees every active posting.
    fn skill_match(&self, job: &Job) -> bool {
        if self.skills.is_empty() {
            return true;
        }
        shares_skill(&job.skills_required, &self.skills)
            || self
                .skills
                .iter()
                .any(|skill| contains_ignore_case(&job.description, skill))
    }

    fn preference_match(&self, job: &Job, company: Option<&Company>) -> bool {
        let preferences = &self.student.preferences;

        if !preferences.job_types.is_empty() && !preferences.job_types.contains(&job.job_type) {
            return false;
        }

        if preferences.remote_work {
            if !job.allows_remote() {
                return false;
            }
        } else if !preferences.locations.is_empty() {
            let matches = job.location.as_deref().is_some_and(|location| {
                preferences
                    .locations
                    .iter()
                    .any(|wanted| wanted.trim().eq_ignore_ascii_case(location.trim()))
            });
            if !matches {
                return false;
            }
        }

        if !preferences.industries.is_empty() {
            let matches = company
                .and_then(|company| company.industry.as_deref())
                .is_some_and(|industry| {
                    preferences
                        .industries
                        .iter()
                        .any(|wanted| wanted.trim().eq_ignore_ascii_case(industry.trim()))
                });
            if !matches {
                return false;
            }
        }

        true
    }
}
