//! End-to-end hiring scenarios driven through the public routers.
//!
//! A recruiter posts a job, a student applies, the recruiter moves the
//! application to an interview, and a platform admin reads the resulting
//! reports. Everything runs against the in-memory store.

mod common {
    use std::collections::BTreeSet;
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{header, Method, Request, Response, StatusCode};
    use axum::Router;
    use chrono::Utc;
    use serde_json::Value;
    use tower::ServiceExt;

    use careerlaunch::admin::{admin_router, AdminService};
    use careerlaunch::applications::{application_router, ApplicationService};
    use careerlaunch::catalog::{catalog_router, JobCatalogService};
    use careerlaunch::identity::{
        AccountStatus, Company, CompanyId, RecruiterProfile, StudentProfile, UserAccount,
        VerificationStatus,
    };
    use careerlaunch::memory::{MemoryOutbox, MemoryStore};
    use careerlaunch::profiles::{profile_router, ProfileService};
    use careerlaunch::{Role, UserId};

    pub(super) struct Platform {
        pub(super) router: Router,
        pub(super) outbox: Arc<MemoryOutbox>,
    }

    fn seed(store: &MemoryStore) {
        for (id, name, role) in [
            ("stu-1", "Ada Lovelace", Role::Student),
            ("rec-1", "Riley Recruiter", Role::Recruiter),
            ("admin-1", "Pat Admin", Role::PlatformAdmin),
        ] {
            store
                .add_user(UserAccount {
                    id: UserId::new(id),
                    name: name.to_string(),
                    email: format!("{id}@example.com"),
                    role,
                    status: AccountStatus::Active,
                    created_at: Utc::now(),
                })
                .expect("seed user");
        }
        store
            .add_company(Company {
                id: CompanyId("co-1".to_string()),
                name: "Acme Robotics".to_string(),
                industry: Some("Robotics".to_string()),
                location: Some("Austin, TX".to_string()),
                description: None,
                website: None,
                verification: VerificationStatus::Verified,
            })
            .expect("seed company");
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
                skills: BTreeSet::from(["rust".to_string(), "sql".to_string()]),
                ..StudentProfile::default()
            })
            .expect("seed student");
    }

    pub(super) fn platform() -> Platform {
        let store = Arc::new(MemoryStore::new());
        seed(&store);
        let outbox = Arc::new(MemoryOutbox::new());

        let router = Router::new()
            .merge(catalog_router(Arc::new(JobCatalogService::new(
                store.clone(),
                outbox.clone(),
            ))))
            .merge(application_router(Arc::new(ApplicationService::new(
                store.clone(),
                outbox.clone(),
            ))))
            .merge(profile_router(Arc::new(ProfileService::new(store.clone()))))
            .merge(admin_router(Arc::new(AdminService::new(store))));

        Platform { router, outbox }
    }

    pub(super) async fn call(
        router: &Router,
        method: Method,
        uri: &str,
        caller: (&str, &str),
        body: Option<Value>,
    ) -> Response<Body> {
        let mut request = Request::builder()
            .method(method)
            .uri(uri)
            .header("x-user-id", caller.0)
            .header("x-user-role", caller.1);
        let body = match body {
            Some(value) => {
                request = request.header(header::CONTENT_TYPE, "application/json");
                Body::from(serde_json::to_vec(&value).expect("serialize"))
            }
            None => Body::empty(),
        };
        router
            .clone()
            .oneshot(request.body(body).expect("request"))
            .await
            .expect("response")
    }

    pub(super) async fn expect_json(response: Response<Body>, status: StatusCode) -> Value {
        assert_eq!(response.status(), status);
        let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
            .await
            .expect("read body");
        serde_json::from_slice(&bytes).expect("json payload")
    }
}

use axum::http::{Method, StatusCode};
use chrono::{Duration, Utc};
use serde_json::json;

use common::*;

const RECRUITER: (&str, &str) = ("rec-1", "recruiter");
const STUDENT: (&str, &str) = ("stu-1", "student");
const ADMIN: (&str, &str) = ("admin-1", "platform_admin");

async fn post_job(platform: &Platform) -> String {
    let job = expect_json(
        call(
            &platform.router,
            Method::POST,
            "/api/v1/jobs",
            RECRUITER,
            Some(json!({
                "title": "Robotics Software Intern",
                "description": "Write control software for warehouse robots.",
                "skills_required": ["rust", "c", "sql", "ros"],
                "job_type": "internship",
                "location": "Austin, TX",
                "salary": { "min": 4000, "max": 6000, "currency": "USD", "period": "monthly" }
            })),
        )
        .await,
        StatusCode::CREATED,
    )
    .await;
    job["id"].as_str().expect("job id").to_string()
}

#[tokio::test]
async fn recruiter_moves_an_application_from_submission_to_interview() {
    let platform = platform();
    let job_id = post_job(&platform).await;

    let listing = expect_json(
        call(
            &platform.router,
            Method::GET,
            "/api/v1/jobs?q=robotics",
            STUDENT,
            None,
        )
        .await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(listing["total"], 1);
    assert_eq!(listing["items"][0]["company"]["name"], "Acme Robotics");

    let application = expect_json(
        call(
            &platform.router,
            Method::POST,
            "/api/v1/applications",
            STUDENT,
            Some(json!({ "job_id": job_id, "cover_letter": "I love robots." })),
        )
        .await,
        StatusCode::CREATED,
    )
    .await;
    assert_eq!(application["skills_match_percentage"], 50);
    let application_id = application["id"].as_str().expect("application id").to_string();

    for status in ["under_review", "shortlisted"] {
        expect_json(
            call(
                &platform.router,
                Method::PATCH,
                &format!("/api/v1/applications/{application_id}/status"),
                RECRUITER,
                Some(json!({ "status": status })),
            )
            .await,
            StatusCode::OK,
        )
        .await;
    }

    let interview_at = (Utc::now() + Duration::days(5)).to_rfc3339();
    let interviewed = expect_json(
        call(
            &platform.router,
            Method::PATCH,
            &format!("/api/v1/applications/{application_id}/status"),
            RECRUITER,
            Some(json!({
                "status": "interviewed",
                "interview_date": interview_at,
                "interview": { "format": "video", "interviewer_name": "Dana" }
            })),
        )
        .await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(interviewed["status_history"].as_array().map(Vec::len), Some(4));

    let backwards = expect_json(
        call(
            &platform.router,
            Method::PATCH,
            &format!("/api/v1/applications/{application_id}/status"),
            RECRUITER,
            Some(json!({ "status": "under_review" })),
        )
        .await,
        StatusCode::BAD_REQUEST,
    )
    .await;
    assert_eq!(backwards["error"]["code"], "BAD_REQUEST");

    let kinds: Vec<&str> = platform
        .outbox
        .notifications()
        .iter()
        .map(|notification| notification.kind())
        .collect();
    assert_eq!(
        kinds,
        vec![
            "application_status_changed",
            "application_status_changed",
            "application_status_changed",
            "application_status_changed",
            "interview_scheduled",
        ]
    );

    let report = expect_json(
        call(
            &platform.router,
            Method::GET,
            "/api/v1/admin/reports/job_applications",
            ADMIN,
            None,
        )
        .await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(report["report"], "job_applications");
    assert_eq!(report["total"], 1);
    assert_eq!(report["by_status"]["interviewed"], 1);

    let trail = expect_json(
        call(
            &platform.router,
            Method::GET,
            "/api/v1/admin/audit?action=application.status_changed",
            ADMIN,
            None,
        )
        .await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(trail.as_array().map(Vec::len), Some(3));
}

#[tokio::test]
async fn jobs_with_applications_are_closed_instead_of_deleted() {
    let platform = platform();
    let job_id = post_job(&platform).await;
    expect_json(
        call(
            &platform.router,
            Method::POST,
            "/api/v1/applications",
            STUDENT,
            Some(json!({ "job_id": job_id })),
        )
        .await,
        StatusCode::CREATED,
    )
    .await;

    let refused = expect_json(
        call(
            &platform.router,
            Method::DELETE,
            &format!("/api/v1/jobs/{job_id}"),
            RECRUITER,
            None,
        )
        .await,
        StatusCode::BAD_REQUEST,
    )
    .await;
    assert_eq!(
        refused["error"]["message"],
        "job has 1 application(s); close it instead"
    );

    let closed = expect_json(
        call(
            &platform.router,
            Method::POST,
            &format!("/api/v1/jobs/{job_id}/close"),
            RECRUITER,
            None,
        )
        .await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(closed["status"], "closed");

    let late = expect_json(
        call(
            &platform.router,
            Method::POST,
            "/api/v1/applications",
            ("stu-1", "student"),
            Some(json!({ "job_id": job_id })),
        )
        .await,
        StatusCode::BAD_REQUEST,
    )
    .await;
    assert_eq!(late["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn admin_surfaces_are_closed_to_other_roles() {
    let platform = platform();

    for caller in [RECRUITER, STUDENT] {
        let denied = expect_json(
            call(
                &platform.router,
                Method::GET,
                "/api/v1/admin/overview",
                caller,
                None,
            )
            .await,
            StatusCode::FORBIDDEN,
        )
        .await;
        assert_eq!(denied["error"]["message"], "admin access required");
    }

    let overview = expect_json(
        call(
            &platform.router,
            Method::GET,
            "/api/v1/admin/overview",
            ADMIN,
            None,
        )
        .await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(overview["total_users"], 3);
    assert_eq!(overview["total_companies"], 1);
}

#[tokio::test]
async fn students_may_withdraw_after_an_interview_is_scheduled() {
    let platform = platform();
    let job_id = post_job(&platform).await;
    let application = expect_json(
        call(
            &platform.router,
            Method::POST,
            "/api/v1/applications",
            STUDENT,
            Some(json!({ "job_id": job_id })),
        )
        .await,
        StatusCode::CREATED,
    )
    .await;
    let application_id = application["id"].as_str().expect("application id").to_string();

    let interviewed = expect_json(
        call(
            &platform.router,
            Method::PATCH,
            &format!("/api/v1/applications/{application_id}/status"),
            RECRUITER,
            Some(json!({
                "status": "interviewed",
                "interview_date": "2026-02-15T10:00:00Z"
            })),
        )
        .await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(interviewed["status_history"].as_array().map(Vec::len), Some(2));
    assert_eq!(
        interviewed["interview"]["scheduled_date"],
        "2026-02-15T10:00:00Z"
    );

    let withdrawn = expect_json(
        call(
            &platform.router,
            Method::POST,
            &format!("/api/v1/applications/{application_id}/withdraw"),
            STUDENT,
            None,
        )
        .await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(withdrawn["status"], "withdrawn");
    assert_eq!(withdrawn["status_history"].as_array().map(Vec::len), Some(3));

    let again = expect_json(
        call(
            &platform.router,
            Method::POST,
            &format!("/api/v1/applications/{application_id}/withdraw"),
            STUDENT,
            None,
        )
        .await,
        StatusCode::BAD_REQUEST,
    )
    .await;
    assert_eq!(again["error"]["message"], "application already withdrawn");
}

#[tokio::test]
async fn jobs_without_applications_can_be_deleted() {
    let platform = platform();
    let job_id = post_job(&platform).await;

    let response = call(
        &platform.router,
        Method::DELETE,
        &format!("/api/v1/jobs/{job_id}"),
        RECRUITER,
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    expect_json(
        call(
            &platform.router,
            Method::GET,
            &format!("/api/v1/jobs/{job_id}"),
            STUDENT,
            None,
        )
        .await,
        StatusCode::NOT_FOUND,
    )
    .await;
}

#[tokio::test]
async fn preferences_saved_by_the_student_steer_recommendations() {
    let platform = platform();
    post_job(&platform).await;

    expect_json(
        call(
            &platform.router,
            Method::PUT,
            "/api/v1/students/me/preferences",
            STUDENT,
            Some(json!({ "remote_work": true })),
        )
        .await,
        StatusCode::OK,
    )
    .await;
    let remote_only = expect_json(
        call(
            &platform.router,
            Method::GET,
            "/api/v1/jobs/recommendations",
            STUDENT,
            None,
        )
        .await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(remote_only, json!([]));

    expect_json(
        call(
            &platform.router,
            Method::PUT,
            "/api/v1/students/me/preferences",
            STUDENT,
            Some(json!({ "remote_work": false, "locations": ["Austin, TX"] })),
        )
        .await,
        StatusCode::OK,
    )
    .await;
    let digest = expect_json(
        call(
            &platform.router,
            Method::POST,
            "/api/v1/jobs/recommendations/notify",
            STUDENT,
            None,
        )
        .await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(digest[0]["title"], "Robotics Software Intern");
    assert_eq!(digest[0]["company"]["name"], "Acme Robotics");
}
