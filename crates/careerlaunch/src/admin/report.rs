use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const TOP_COMPANIES: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    UserRegistrations,
    JobApplications,
    CompanyActivity,
}

impl ReportKind {
    pub const ALL: [ReportKind; 3] = [
        ReportKind::UserRegistrations,
        ReportKind::JobApplications,
        ReportKind::CompanyActivity,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            ReportKind::UserRegistrations => "user_registrations",
            ReportKind::JobApplications => "job_applications",
            ReportKind::CompanyActivity => "company_activity",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown report type '{0}'")]
pub struct UnknownReport(pub String);

impl FromStr for ReportKind {
    type Err = UnknownReport;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        ReportKind::ALL
            .into_iter()
            .find(|kind| kind.label() == value.trim())
            .ok_or_else(|| UnknownReport(value.to_string()))
    }
}

/// Inclusive time window; open ends are unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportWindow {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl ReportWindow {
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start.map_or(true, |start| at >= start) && self.end.map_or(true, |end| at <= end)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyActivity {
    pub company_name: String,
    pub jobs_posted: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "report", rename_all = "snake_case")]
pub enum Report {
    UserRegistrations {
        total: usize,
        by_role: BTreeMap<String, usize>,
    },
    JobApplications {
        total: usize,
        by_status: BTreeMap<String, usize>,
    },
    CompanyActivity {
        top_companies: Vec<CompanyActivity>,
    },
}

#[derive(Serialize)]
struct CountRow<'a> {
    group: &'a str,
    count: usize,
}

impl Report {
    /// Rank companies by postings in the window, keeping the busiest twenty.
    pub fn company_activity(mut counts: Vec<CompanyActivity>) -> Self {
        counts.sort_by(|a, b| {
            b.jobs_posted
                .cmp(&a.jobs_posted)
                .then_with(|| a.company_name.cmp(&b.company_name))
        });
        counts.truncate(TOP_COMPANIES);
        Report::CompanyActivity {
            top_companies: counts,
        }
    }

    /// Flatten the report into CSV with a header row.
    pub fn to_csv(&self) -> Result<String, csv::Error> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        match self {
            Report::UserRegistrations { total, by_role: groups }
            | Report::JobApplications {
                total,
                by_status: groups,
            } => {
                for (group, count) in groups {
                    writer.serialize(CountRow {
                        group,
                        count: *count,
                    })?;
                }
                writer.serialize(CountRow {
                    group: "total",
                    count: *total,
                })?;
            }
            Report::CompanyActivity { top_companies } => {
                for row in top_companies {
                    writer.serialize(row)?;
                }
            }
        }

        let bytes = writer
            .into_inner()
            .map_err(|error| csv::Error::from(error.into_error()))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}
