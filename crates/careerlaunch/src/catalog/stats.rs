use std::collections::HashMap;

use serde::Serialize;

use super::domain::{Job, JobStatus, JobType};

const TOP_CATEGORIES: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub category: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobTypeCount {
    pub job_type: JobType,
    pub count: usize,
}

/// Catalog-wide aggregates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobStats {
    pub total_jobs: usize,
    pub active_jobs: usize,
    pub total_applications: u64,
    pub average_applications_per_job: u64,
    pub top_categories: Vec<CategoryCount>,
    pub jobs_by_type: Vec<JobTypeCount>,
}

impl JobStats {
    pub fn from_jobs(jobs: &[Job]) -> Self {
        let total_jobs = jobs.len();
        let active_jobs = jobs
            .iter()
            .filter(|job| job.status == JobStatus::Active)
            .count();
        let total_applications: u64 = jobs.iter().map(|job| job.application_count).sum();
        let average_applications_per_job = match total_jobs as u64 {
            0 => 0,
            count => (total_applications * 2 + count) / (count * 2),
        };

        let mut categories: HashMap<&str, usize> = HashMap::new();
        for category in jobs.iter().filter_map(|job| job.category.as_deref()) {
            *categories.entry(category).or_default() += 1;
        }
        let mut top_categories: Vec<CategoryCount> = categories
            .into_iter()
            .map(|(category, count)| CategoryCount {
                category: category.to_string(),
                count,
            })
            .collect();
        top_categories.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.category.cmp(&b.category)));
        top_categories.truncate(TOP_CATEGORIES);

        let mut types: HashMap<JobType, usize> = HashMap::new();
        for job in jobs {
            *types.entry(job.job_type).or_default() += 1;
        }
        let mut jobs_by_type: Vec<JobTypeCount> = types
            .into_iter()
            .map(|(job_type, count)| JobTypeCount { job_type, count })
            .collect();
        jobs_by_type.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.job_type.cmp(&b.job_type)));

        Self {
            total_jobs,
            active_jobs,
            total_applications,
            average_applications_per_job,
            top_categories,
            jobs_by_type,
        }
    }
}
