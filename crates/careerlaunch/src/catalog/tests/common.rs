use std::collections::BTreeSet;
use std::sync::Arc;

use axum::response::Response;
use chrono::Utc;
use serde_json::{json, Value};

use crate::catalog::{catalog_router, Job, JobCatalogService, JobDraft};
use crate::identity::{
    AccountStatus, Caller, Company, CompanyId, JobPreferences, RecruiterProfile, Role,
    StudentProfile, UserAccount, UserId, VerificationStatus,
};
use crate::memory::{MemoryOutbox, MemoryStore};

pub(super) type Catalog = JobCatalogService<MemoryStore, MemoryOutbox>;

pub(super) fn recruiter() -> Caller {
    Caller::new("rec-1", Role::Recruiter)
}

pub(super) fn other_recruiter() -> Caller {
    Caller::new("rec-2", Role::Recruiter)
}

pub(super) fn student() -> Caller {
    Caller::new("stu-1", Role::Student)
}

pub(super) fn admin() -> Caller {
    Caller::new("admin-1", Role::PlatformAdmin)
}

fn account(id: &str, role: Role) -> UserAccount {
    UserAccount {
        id: UserId::new(id),
        name: format!("User {id}"),
        email: format!("{id}@example.com"),
        role,
        status: AccountStatus::Active,
        created_at: Utc::now(),
    }
}

pub(super) fn store() -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    for (id, role) in [
        ("rec-1", Role::Recruiter),
        ("rec-2", Role::Recruiter),
        ("stu-1", Role::Student),
        ("admin-1", Role::PlatformAdmin),
    ] {
        store.add_user(account(id, role)).expect("seed user");
    }
    for (id, name, industry) in [
        ("co-1", "Acme Robotics", "Technology"),
        ("co-2", "Harbor Health", "Healthcare"),
    ] {
        store
            .add_company(Company {
                id: CompanyId(id.to_string()),
                name: name.to_string(),
                industry: Some(industry.to_string()),
                location: Some("Austin".to_string()),
                description: None,
                website: None,
                verification: VerificationStatus::Verified,
            })
            .expect("seed company");
    }
    for (user, company) in [("rec-1", "co-1"), ("rec-2", "co-2")] {
        store
            .add_recruiter(RecruiterProfile {
                user_id: UserId::new(user),
                company_id: CompanyId(company.to_string()),
                position: Some("Talent Partner".to_string()),
            })
            .expect("seed recruiter");
    }
    store
        .add_student(StudentProfile {
            user_id: UserId::new("stu-1"),
            skills: BTreeSet::from(["Rust".to_string(), "SQL".to_string()]),
            preferences: JobPreferences::default(),
            ..StudentProfile::default()
        })
        .expect("seed student");
    store
}

pub(super) fn build_service() -> (Arc<Catalog>, Arc<MemoryStore>, Arc<MemoryOutbox>) {
    let store = store();
    let outbox = Arc::new(MemoryOutbox::new());
    let service = Arc::new(JobCatalogService::new(store.clone(), outbox.clone()));
    (service, store, outbox)
}

pub(super) fn router_with_service(service: Arc<Catalog>) -> axum::Router {
    catalog_router(service)
}

pub(super) fn draft_json(title: &str) -> Value {
    json!({
        "title": title,
        "description": "Work on embedded control software.",
        "skills_required": ["rust", "c"],
        "job_type": "internship",
        "location": "Austin, TX",
        "salary": { "min": 4000, "max": 6000, "currency": "USD", "period": "monthly" },
    })
}

pub(super) fn draft(title: &str) -> JobDraft {
    serde_json::from_value(draft_json(title)).expect("valid draft")
}

pub(super) fn post(service: &Catalog, title: &str) -> Job {
    service.create(&recruiter(), draft(title)).expect("job created")
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
