use std::collections::BTreeSet;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request};
use axum::response::Response;
use chrono::Utc;
use serde_json::Value;
use tower::ServiceExt;

use crate::identity::{
    AccountStatus, Caller, Company, CompanyId, RecruiterProfile, Role, StudentProfile,
    UserAccount, UserId, VerificationStatus,
};
use crate::memory::MemoryStore;
use crate::profiles::{profile_router, ProfileService};

pub(super) type Profiles = ProfileService<MemoryStore>;

pub(super) fn student() -> Caller {
    Caller::new("stu-1", Role::Student)
}

pub(super) fn recruiter() -> Caller {
    Caller::new("rec-1", Role::Recruiter)
}

/// Recruiter account with no employer yet.
pub(super) fn new_recruiter() -> Caller {
    Caller::new("rec-2", Role::Recruiter)
}

pub(super) fn admin() -> Caller {
    Caller::new("admin-1", Role::PlatformAdmin)
}

pub(super) fn store() -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    for (id, role) in [
        ("stu-1", Role::Student),
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
    for (id, name, verification) in [
        ("co-1", "Acme Robotics", VerificationStatus::Verified),
        ("co-2", "Shadow Labs", VerificationStatus::Pending),
    ] {
        store
            .add_company(Company {
                id: CompanyId(id.to_string()),
                name: name.to_string(),
                industry: Some("Technology".to_string()),
                location: Some("Austin, TX".to_string()),
                description: Some("Warehouse automation".to_string()),
                website: None,
                verification,
            })
            .expect("seed company");
    }
    store
        .add_recruiter(RecruiterProfile {
            user_id: UserId::new("rec-1"),
            company_id: CompanyId("co-1".to_string()),
            position: Some("Talent Lead".to_string()),
        })
        .expect("seed recruiter");
    store
        .add_student(StudentProfile {
            user_id: UserId::new("stu-1"),
            skills: BTreeSet::from(["rust".to_string()]),
            ..StudentProfile::default()
        })
        .expect("seed student");
    store
}

pub(super) fn build_service() -> (Arc<Profiles>, Arc<MemoryStore>) {
    let store = store();
    (Arc::new(ProfileService::new(store.clone())), store)
}

pub(super) async fn send(
    service: Arc<Profiles>,
    method: Method,
    uri: &str,
    caller: &Caller,
    body: Option<Value>,
) -> Response {
    let mut request = Request::builder()
        .method(method)
        .uri(uri)
        .header("x-user-id", caller.user_id.to_string())
        .header("x-user-role", caller.role.label());
    let body = match body {
        Some(value) => {
            request = request.header(header::CONTENT_TYPE, "application/json");
            Body::from(serde_json::to_vec(&value).expect("serialize"))
        }
        None => Body::empty(),
    };
    profile_router(service)
        .oneshot(request.body(body).expect("request"))
        .await
        .expect("response")
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
