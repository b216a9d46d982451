use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::domain::{ExperienceLevel, Job, JobStatus, JobType};
use super::matching::{contains_ignore_case, shares_skill};
use crate::identity::Company;
use crate::repository::PageRequest;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobSortKey {
    #[default]
    CreatedAt,
    PublishedAt,
    Title,
    ApplicationCount,
    Deadline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    }
}

/// Query-string filters accepted by job search.
///
/// `skills` is a comma separated list so it survives URL encoding unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobSearchFilters {
    pub q: Option<String>,
    pub location: Option<String>,
    pub industry: Option<String>,
    pub job_type: Option<JobType>,
    pub experience_level: Option<ExperienceLevel>,
    pub is_remote: Option<bool>,
    pub skills: Option<String>,
    pub min_salary: Option<u32>,
    pub max_salary: Option<u32>,
    pub page: Option<usize>,
    pub limit: Option<usize>,
    pub sort_by: Option<JobSortKey>,
    pub sort_order: Option<SortOrder>,
}

impl JobSearchFilters {
    pub fn page_request(&self) -> PageRequest {
        PageRequest::new(self.page, self.limit)
    }

    pub fn skill_list(&self) -> Vec<String> {
        self.skills
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|skill| !skill.is_empty())
            .map(str::to_string)
            .collect()
    }

    fn remote_only(&self) -> bool {
        self.is_remote.unwrap_or(false)
    }

    /// Whether an active posting passes every populated filter.
    pub fn matches(&self, job: &Job, company: Option<&Company>) -> bool {
        if job.status != JobStatus::Active {
            return false;
        }

        if let Some(query) = non_blank(&self.q) {
            let in_title = contains_ignore_case(&job.title, query);
            let in_description = contains_ignore_case(&job.description, query);
            let in_category = job
                .category
                .as_deref()
                .is_some_and(|category| contains_ignore_case(category, query));
            if !(in_title || in_description || in_category) {
                return false;
            }
        }

        if self.remote_only() {
            if !job.allows_remote() {
                return false;
            }
        } else if let Some(location) = non_blank(&self.location) {
            let matches = job
                .location
                .as_deref()
                .is_some_and(|value| contains_ignore_case(value, location));
            if !matches {
                return false;
            }
        }

        if let Some(industry) = non_blank(&self.industry) {
            let matches = company
                .and_then(|company| company.industry.as_deref())
                .is_some_and(|value| contains_ignore_case(value, industry));
            if !matches {
                return false;
            }
        }

        if self.job_type.is_some_and(|job_type| job.job_type != job_type) {
            return false;
        }

        if self
            .experience_level
            .is_some_and(|level| job.experience_level != level)
        {
            return false;
        }

        let skills = self.skill_list();
        if !skills.is_empty() && !shares_skill(&job.skills_required, &skills) {
            return false;
        }

        if let Some(min_salary) = self.min_salary {
            let offered = job.salary.as_ref().and_then(|salary| salary.min);
            if !offered.is_some_and(|min| min >= min_salary) {
                return false;
            }
        }

        if let Some(max_salary) = self.max_salary {
            let offered = job.salary.as_ref().and_then(|salary| salary.max);
            if !offered.is_some_and(|max| max <= max_salary) {
                return false;
            }
        }

        true
    }

    /// Order results by the requested key; ties fall back to the job id so
    /// consecutive pages never overlap.
    pub fn sort(&self, jobs: &mut [Job]) {
        let key = self.sort_by.unwrap_or_default();
        let order = self.sort_order.unwrap_or_default();
        jobs.sort_by(|left, right| {
            order
                .apply(compare_by(key, left, right))
                .then_with(|| order.apply(left.id.cmp(&right.id)))
        });
    }
}

fn compare_by(key: JobSortKey, left: &Job, right: &Job) -> Ordering {
    match key {
        JobSortKey::CreatedAt => left.created_at.cmp(&right.created_at),
        JobSortKey::PublishedAt => left.published_at.cmp(&right.published_at),
        JobSortKey::Title => left
            .title
            .to_lowercase()
            .cmp(&right.title.to_lowercase()),
        JobSortKey::ApplicationCount => left.application_count.cmp(&right.application_count),
        JobSortKey::Deadline => left.deadline.cmp(&right.deadline),
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
}
