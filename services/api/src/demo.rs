use crate::infra::{
    parse_date, seed_demo_accounts, start_of_day, Services, DEMO_ADMIN, DEMO_RECRUITER,
    DEMO_STUDENT,
};
use careerlaunch::admin::{ReportKind, ReportWindow};
use careerlaunch::applications::{
    ApplicationStatus, ApplicationSubmission, InterviewFormat, InterviewSchedule, StatusUpdate,
};
use careerlaunch::catalog::{ExperienceLevel, JobDraft, JobType, PayPeriod, SalaryRange};
use careerlaunch::config::AppConfig;
use careerlaunch::error::AppError;
use careerlaunch::memory::{MemoryOutbox, MemoryStore};
use careerlaunch::notifications::OutboundEmail;
use careerlaunch::portfolio::{
    GitHubProvider, Platform, PortfolioDraft, RepositoryProvider, SyncRequest,
};
use careerlaunch::{Caller, Role, UserId};
use chrono::{Duration, NaiveDate, Utc};
use clap::{Args, ValueEnum};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum DemoReportFormat {
    #[default]
    Json,
    Csv,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Output format for the admin reports printed at the end of the demo.
    #[arg(long, value_enum, default_value_t = DemoReportFormat::Json)]
    pub(crate) format: DemoReportFormat,
    /// Only include activity on or after this date (YYYY-MM-DD) in the reports.
    #[arg(long, value_parser = parse_date)]
    pub(crate) since: Option<NaiveDate>,
    /// Sync a live GitHub account into the demo student's portfolio.
    #[arg(long)]
    pub(crate) github_user: Option<String>,
}

type DemoServices = Services<MemoryOutbox, GitHubProvider>;

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        format,
        since,
        github_user,
    } = args;

    let config = AppConfig::load()?;
    let store = Arc::new(MemoryStore::new());
    seed_demo_accounts(&store)?;
    let outbox = Arc::new(MemoryOutbox::new());
    let provider = Arc::new(GitHubProvider::new(&config.github)?);
    let services = Services::new(
        store,
        outbox.clone(),
        provider,
        config.github.max_pages,
    );

    println!("CareerLaunch hiring demo");
    if !run_hiring_flow(&services) {
        return Ok(());
    }

    if let Some(username) = github_user {
        run_portfolio_sync(&services, username).await;
    }

    println!("\nQueued notifications");
    for notification in outbox.notifications() {
        let email = OutboundEmail::render(&notification, &config.notifications);
        println!("  - [{}] to {}: {}", notification.kind(), email.to, email.subject);
    }

    let window = ReportWindow {
        start: since.map(start_of_day),
        end: None,
    };
    print_reports(&services, format, window);
    Ok(())
}

/// Returns `false` when a step failed and the rest of the demo is pointless.
fn run_hiring_flow(services: &DemoServices) -> bool {
    let recruiter = Caller::new(DEMO_RECRUITER, Role::Recruiter);
    let student = Caller::new(DEMO_STUDENT, Role::Student);

    let job = match services.catalog.create(&recruiter, demo_job_draft()) {
        Ok(job) => job,
        Err(err) => {
            println!("  Job posting rejected: {err}");
            return false;
        }
    };
    println!("- {} posted {} ({})", DEMO_RECRUITER, job.title, job.id);

    match services.catalog.recommend(&UserId::new(DEMO_STUDENT), Some(3)) {
        Ok(recommended) => {
            println!("- Recommendations for {DEMO_STUDENT}:");
            for view in recommended {
                let company = view
                    .company
                    .map(|company| company.name)
                    .unwrap_or_else(|| "unknown company".to_string());
                println!("    - {} at {}", view.job.title, company);
            }
        }
        Err(err) => println!("  Recommendations unavailable: {err}"),
    }

    let submission = ApplicationSubmission {
        job_id: job.id.clone(),
        cover_letter: Some("I have shipped Rust services and love robotics.".to_string()),
        expected_salary: None,
        availability_date: Some((Utc::now() + Duration::days(30)).date_naive()),
    };
    let record = match services.applications.submit(&student, submission) {
        Ok(record) => record,
        Err(err) => {
            println!("  Application rejected: {err}");
            return false;
        }
    };
    println!(
        "- {} applied: {} ({}% skills match)",
        DEMO_STUDENT,
        record.id,
        record.skills_match_percentage.unwrap_or_default()
    );

    let mut interview = StatusUpdate::to(ApplicationStatus::Interviewed);
    interview.interview_date = Some(Utc::now() + Duration::days(7));
    interview.interview = Some(InterviewSchedule {
        format: Some(InterviewFormat::Video),
        interviewer_name: Some("Riley Recruiter".to_string()),
        ..InterviewSchedule::default()
    });
    let steps = [
        StatusUpdate::to(ApplicationStatus::UnderReview),
        StatusUpdate::to(ApplicationStatus::Shortlisted),
        interview,
    ];
    for update in steps {
        let target = update.status;
        match services
            .applications
            .update_status(&record.id, update, &recruiter)
        {
            Ok(updated) => println!("  -> {}", updated.status),
            Err(err) => {
                println!("  Could not move application to {target}: {err}");
                return false;
            }
        }
    }
    true
}

async fn run_portfolio_sync<P>(services: &Services<MemoryOutbox, P>, username: String)
where
    P: RepositoryProvider + 'static,
{
    let student = Caller::new(DEMO_STUDENT, Role::Student);
    println!("\nPortfolio sync for github user {username}");

    let draft = PortfolioDraft {
        platform: Platform::Github,
        profile_url: format!("https://github.com/{username}"),
        title: Some("Open source work".to_string()),
        description: None,
        is_public: true,
        auto_sync: false,
    };
    let portfolio = match services.portfolios.create(&student, draft) {
        Ok(portfolio) => portfolio,
        Err(err) => {
            println!("  Portfolio rejected: {err}");
            return;
        }
    };

    let request = SyncRequest {
        username,
        access_token: None,
    };
    match services
        .portfolios
        .sync(&portfolio.id, request, &student)
        .await
    {
        Ok(report) => {
            println!(
                "- {} projects imported, {} updated",
                report.projects_imported, report.projects_updated
            );
            println!("- Skills found: {}", report.skills_found.join(", "));
        }
        Err(err) => println!("  Sync failed: {err}"),
    }
}

fn print_reports(services: &DemoServices, format: DemoReportFormat, window: ReportWindow) {
    let admin = Caller::new(DEMO_ADMIN, Role::PlatformAdmin);

    match services.admin.overview(&admin) {
        Ok(overview) => println!(
            "\nPlatform overview: {} users | {} companies | {} jobs | {} applications",
            overview.total_users,
            overview.total_companies,
            overview.total_jobs,
            overview.total_applications
        ),
        Err(err) => println!("\nPlatform overview unavailable: {err}"),
    }

    for kind in ReportKind::ALL {
        println!("\nReport: {}", kind.label());
        let rendered = match format {
            DemoReportFormat::Json => services
                .admin
                .report(&admin, kind.label(), window)
                .map(|report| {
                    serde_json::to_string_pretty(&report)
                        .unwrap_or_else(|err| format!("  Report payload unavailable: {err}"))
                }),
            DemoReportFormat::Csv => services.admin.report_csv(&admin, kind.label(), window),
        };
        match rendered {
            Ok(text) => println!("{}", text.trim_end()),
            Err(err) => println!("  Report unavailable: {err}"),
        }
    }
}

fn demo_job_draft() -> JobDraft {
    JobDraft {
        title: "Robotics Software Intern".to_string(),
        description: "Build fleet control services for warehouse robots.".to_string(),
        requirements: vec!["Comfortable with systems programming".to_string()],
        skills_required: ["rust", "sql", "ros", "c"].map(str::to_string).into(),
        experience_level: ExperienceLevel::Entry,
        job_type: JobType::Internship,
        salary: Some(SalaryRange {
            min: Some(4000),
            max: Some(6000),
            currency: "USD".to_string(),
            period: Some(PayPeriod::Monthly),
        }),
        location: Some("Austin, TX".to_string()),
        is_remote: false,
        is_hybrid: true,
        deadline: Some(Utc::now() + Duration::days(45)),
        category: Some("Engineering".to_string()),
        tags: vec!["robotics".to_string()],
        benefits: vec!["Mentorship".to_string()],
        positions: 2,
        is_featured: true,
        draft: false,
    }
}
