use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, Request, StatusCode};
use axum::response::IntoResponse;
use tower::ServiceExt;

use super::common::*;
use crate::catalog::router::{delete_handler, get_handler};
use crate::memory::{MemoryOutbox, MemoryStore};

fn with_caller(builder: axum::http::request::Builder, user: &str, role: &str) -> axum::http::request::Builder {
    builder.header("x-user-id", user).header("x-user-role", role)
}

#[tokio::test]
async fn create_route_returns_created_job() {
    let (service, _, _) = build_service();
    let router = router_with_service(service);

    let response = router
        .oneshot(
            with_caller(Request::post("/api/v1/jobs"), "rec-1", "recruiter")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    serde_json::to_vec(&draft_json("Firmware Intern")).expect("serialize"),
                ))
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::CREATED);
    let payload = read_json_body(response).await;
    assert_eq!(payload["status"], "active");
    assert_eq!(payload["company_id"], "co-1");
}

#[tokio::test]
async fn create_route_rejects_students() {
    let (service, _, _) = build_service();
    let router = router_with_service(service);

    let response = router
        .oneshot(
            with_caller(Request::post("/api/v1/jobs"), "stu-1", "student")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    serde_json::to_vec(&draft_json("Firmware Intern")).expect("serialize"),
                ))
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let payload = read_json_body(response).await;
    assert_eq!(payload["error"]["code"], "FORBIDDEN");
}

#[tokio::test]
async fn requests_without_identity_headers_are_unauthorized() {
    let (service, _, _) = build_service();
    let router = router_with_service(service);

    let response = router
        .oneshot(
            Request::get("/api/v1/jobs")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn search_route_reads_query_filters() {
    let (service, _, _) = build_service();
    post(&service, "Firmware Intern");
    post(&service, "Clinical Data Intern");
    let router = router_with_service(service);

    let response = router
        .oneshot(
            with_caller(
                Request::get("/api/v1/jobs?q=firmware&job_type=internship&limit=5"),
                "stu-1",
                "student",
            )
            .body(Body::empty())
            .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["total"], 1);
    assert_eq!(payload["limit"], 5);
    assert_eq!(payload["items"][0]["title"], "Firmware Intern");
    assert_eq!(payload["items"][0]["company"]["name"], "Acme Robotics");
}

#[tokio::test]
async fn recommendations_route_is_student_only() {
    let (service, _, _) = build_service();
    let router = router_with_service(service);

    let response = router
        .oneshot(
            with_caller(
                Request::get("/api/v1/jobs/recommendations"),
                "rec-1",
                "recruiter",
            )
            .body(Body::empty())
            .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn notify_route_sends_the_students_matches() {
    let (service, _, outbox) = build_service();
    post(&service, "Firmware Intern");
    let router = router_with_service(service);

    let response = router
        .clone()
        .oneshot(
            with_caller(
                Request::post("/api/v1/jobs/recommendations/notify?limit=3"),
                "stu-1",
                "student",
            )
            .body(Body::empty())
            .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body.as_array().map(Vec::len), Some(1));
    assert_eq!(outbox.notifications().len(), 1);
    assert_eq!(outbox.notifications()[0].kind(), "job_matches");

    let response = router
        .oneshot(
            with_caller(
                Request::post("/api/v1/jobs/recommendations/notify"),
                "rec-1",
                "recruiter",
            )
            .body(Body::empty())
            .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(outbox.notifications().len(), 1);
}

#[tokio::test]
async fn publish_route_transitions_draft_jobs() {
    let (service, _, _) = build_service();
    let mut draft = draft("Data Analyst");
    draft.draft = true;
    let job = service.create(&recruiter(), draft).expect("draft");
    let router = router_with_service(service);

    let response = router
        .oneshot(
            with_caller(
                Request::post(format!("/api/v1/jobs/{}/publish", job.id)),
                "rec-1",
                "recruiter",
            )
            .body(Body::empty())
            .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["status"], "active");
}

#[tokio::test]
async fn get_handler_returns_not_found_for_unknown_jobs() {
    let (service, _, _) = build_service();

    let response = get_handler::<MemoryStore, MemoryOutbox>(
        State(service),
        student(),
        Path("job-missing".to_string()),
    )
    .await
    .into_response();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_handler_returns_no_content() {
    let (service, _, _) = build_service();
    let job = post(&service, "Firmware Intern");

    let response = delete_handler::<MemoryStore, MemoryOutbox>(
        State(service),
        recruiter(),
        Path(job.id.0.clone()),
    )
    .await
    .into_response();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}
