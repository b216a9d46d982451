use std::collections::BTreeSet;
use std::sync::Arc;

use axum::response::Response;
use chrono::Utc;
use serde_json::{json, Value};

use crate::applications::{
    application_router, ApplicationRecord, ApplicationService, ApplicationSubmission,
};
use crate::catalog::{Job, JobCatalogService, JobDraft};
use crate::identity::{
    AccountStatus, Caller, Company, CompanyId, RecruiterProfile, Role, StudentProfile,
    UserAccount, UserId, VerificationStatus,
};
use crate::memory::{MemoryOutbox, MemoryStore};

pub(super) type Applications = ApplicationService<MemoryStore, MemoryOutbox>;

pub(super) fn student() -> Caller {
    Caller::new("stu-1", Role::Student)
}

pub(super) fn other_student() -> Caller {
    Caller::new("stu-2", Role::Student)
}

pub(super) fn recruiter() -> Caller {
    Caller::new("rec-1", Role::Recruiter)
}

pub(super) fn rival_recruiter() -> Caller {
    Caller::new("rec-2", Role::Recruiter)
}

pub(super) fn university_admin() -> Caller {
    Caller::new("uni-1", Role::UniversityAdmin)
}

pub(super) fn platform_admin() -> Caller {
    Caller::new("admin-1", Role::PlatformAdmin)
}

pub(super) fn store() -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    for (id, role) in [
        ("stu-1", Role::Student),
        ("stu-2", Role::Student),
        ("rec-1", Role::Recruiter),
        ("rec-2", Role::Recruiter),
        ("uni-1", Role::UniversityAdmin),
        ("admin-1", Role::PlatformAdmin),
    ] {
        store
            .add_user(UserAccount {
                id: UserId::new(id),
                name: format!("User {id}"),
                email: format!("{id}@example.com"),
                role,
                status: AccountStatus::Active,
                created_at: Utc::now(),
            })
            .expect("seed user");
    }
    for (company, recruiter) in [("co-1", "rec-1"), ("co-2", "rec-2")] {
        store
            .add_company(Company {
                id: CompanyId(company.to_string()),
                name: format!("Company {company}"),
                industry: None,
                location: None,
                description: None,
                website: None,
                verification: VerificationStatus::Verified,
            })
            .expect("seed company");
        store
            .add_recruiter(RecruiterProfile {
                user_id: UserId::new(recruiter),
                company_id: CompanyId(company.to_string()),
                position: None,
            })
            .expect("seed recruiter");
    }
    store
        .add_student(StudentProfile {
            user_id: UserId::new("stu-1"),
            skills: BTreeSet::from(["rust".to_string(), "sql".to_string()]),
            ..StudentProfile::default()
        })
        .expect("seed student");
    store
        .add_student(StudentProfile {
            user_id: UserId::new("stu-2"),
            ..StudentProfile::default()
        })
        .expect("seed student");
    store
}

pub(super) fn build_service() -> (Arc<Applications>, Arc<MemoryStore>, Arc<MemoryOutbox>) {
    let store = store();
    let outbox = Arc::new(MemoryOutbox::new());
    let service = Arc::new(ApplicationService::new(store.clone(), outbox.clone()));
    (service, store, outbox)
}

pub(super) fn router_with_service(service: Arc<Applications>) -> axum::Router {
    application_router(service)
}

/// Post a job for `rec-1` requiring rust, go, sql, and c.
pub(super) fn post_job(store: &Arc<MemoryStore>, extra: Value) -> Job {
    let catalog = JobCatalogService::new(store.clone(), Arc::new(MemoryOutbox::new()));
    let mut body = json!({
        "title": "Backend Intern",
        "description": "Ship services.",
        "skills_required": ["rust", "go", "sql", "c"],
    });
    if let (Some(target), Some(extra)) = (body.as_object_mut(), extra.as_object()) {
        for (key, value) in extra {
            target.insert(key.clone(), value.clone());
        }
    }
    let draft: JobDraft = serde_json::from_value(body).expect("valid draft");
    catalog.create(&recruiter(), draft).expect("job created")
}

pub(super) fn submission(job: &Job) -> ApplicationSubmission {
    ApplicationSubmission {
        job_id: job.id.clone(),
        cover_letter: Some("I build reliable backends.".to_string()),
        expected_salary: None,
        availability_date: None,
    }
}

pub(super) fn submit(service: &Applications, caller: &Caller, job: &Job) -> ApplicationRecord {
    service
        .submit(caller, submission(job))
        .expect("application submitted")
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
