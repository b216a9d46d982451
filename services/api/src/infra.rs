use std::collections::BTreeSet;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use metrics_exporter_prometheus::PrometheusHandle;

use careerlaunch::admin::AdminService;
use careerlaunch::applications::ApplicationService;
use careerlaunch::catalog::{JobCatalogService, JobType};
use careerlaunch::identity::{
    AccountStatus, Company, CompanyId, JobPreferences, RecruiterProfile, StudentProfile,
    UserAccount, VerificationStatus,
};
use careerlaunch::memory::MemoryStore;
use careerlaunch::notifications::NotificationPublisher;
use careerlaunch::portfolio::{PortfolioService, RepositoryProvider};
use careerlaunch::profiles::ProfileService;
use careerlaunch::repository::RepositoryError;
use careerlaunch::{Role, UserId};

pub(crate) const DEMO_RECRUITER: &str = "rec-1";
pub(crate) const DEMO_STUDENT: &str = "stu-1";
pub(crate) const DEMO_ADMIN: &str = "admin-1";

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Every component service wired against one shared store.
pub(crate) struct Services<N, P> {
    pub(crate) catalog: Arc<JobCatalogService<MemoryStore, N>>,
    pub(crate) applications: Arc<ApplicationService<MemoryStore, N>>,
    pub(crate) portfolios: Arc<PortfolioService<MemoryStore, P>>,
    pub(crate) profiles: Arc<ProfileService<MemoryStore>>,
    pub(crate) admin: Arc<AdminService<MemoryStore>>,
}

impl<N, P> Services<N, P>
where
    N: NotificationPublisher + 'static,
    P: RepositoryProvider + 'static,
{
    pub(crate) fn new(
        store: Arc<MemoryStore>,
        publisher: Arc<N>,
        provider: Arc<P>,
        max_pages: u32,
    ) -> Self {
        Self {
            catalog: Arc::new(JobCatalogService::new(store.clone(), publisher.clone())),
            applications: Arc::new(ApplicationService::new(store.clone(), publisher)),
            portfolios: Arc::new(PortfolioService::new(store.clone(), provider, max_pages)),
            profiles: Arc::new(ProfileService::new(store.clone())),
            admin: Arc::new(AdminService::new(store)),
        }
    }
}

/// Populate the directory with one account per role plus two employers.
pub(crate) fn seed_demo_accounts(store: &MemoryStore) -> Result<(), RepositoryError> {
    let now = Utc::now();
    for (id, name, role) in [
        (DEMO_ADMIN, "Pat Admin", Role::PlatformAdmin),
        (DEMO_RECRUITER, "Riley Recruiter", Role::Recruiter),
        ("rec-2", "Morgan Recruiter", Role::Recruiter),
        (DEMO_STUDENT, "Ada Lovelace", Role::Student),
        ("stu-2", "Grace Hopper", Role::Student),
        ("uni-1", "Uma Registrar", Role::UniversityAdmin),
    ] {
        store.add_user(UserAccount {
            id: UserId::new(id),
            name: name.to_string(),
            email: format!("{id}@careerlaunch.dev"),
            role,
            status: AccountStatus::Active,
            created_at: now,
        })?;
    }

    for (company, name, industry, recruiter) in [
        ("co-1", "Acme Robotics", "Robotics", DEMO_RECRUITER),
        ("co-2", "Harbor Health", "Healthcare", "rec-2"),
    ] {
        store.add_company(Company {
            id: CompanyId(company.to_string()),
            name: name.to_string(),
            industry: Some(industry.to_string()),
            location: Some("Austin, TX".to_string()),
            description: None,
            website: None,
            verification: VerificationStatus::Verified,
        })?;
        store.add_recruiter(RecruiterProfile {
            user_id: UserId::new(recruiter),
            company_id: CompanyId(company.to_string()),
            position: Some("Talent Partner".to_string()),
        })?;
    }

    store.add_student(StudentProfile {
        user_id: UserId::new(DEMO_STUDENT),
        skills: ["rust", "sql", "python"].map(str::to_string).into(),
        programming_languages: BTreeSet::from(["Rust".to_string()]),
        preferences: JobPreferences {
            job_types: vec![JobType::Internship],
            locations: vec!["Austin".to_string()],
            ..JobPreferences::default()
        },
        major: Some("Computer Science".to_string()),
        graduation_year: Some(2027),
        ..StudentProfile::default()
    })?;
    store.add_student(StudentProfile {
        user_id: UserId::new("stu-2"),
        skills: ["java", "sql"].map(str::to_string).into(),
        ..StudentProfile::default()
    })?;
    Ok(())
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

pub(crate) fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}
