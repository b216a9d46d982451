use crate::infra::{AppState, Services};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Json, Router};
use careerlaunch::admin::admin_router;
use careerlaunch::applications::application_router;
use careerlaunch::catalog::catalog_router;
use careerlaunch::notifications::NotificationPublisher;
use careerlaunch::portfolio::{portfolio_router, RepositoryProvider};
use careerlaunch::profiles::profile_router;
use serde_json::json;

/// Merge every component router with the operational endpoints.
pub(crate) fn platform_routes<N, P>(services: &Services<N, P>) -> Router
where
    N: NotificationPublisher + 'static,
    P: RepositoryProvider + 'static,
{
    Router::new()
        .merge(catalog_router(services.catalog.clone()))
        .merge(application_router(services.applications.clone()))
        .merge(portfolio_router(services.portfolios.clone()))
        .merge(profile_router(services.profiles.clone()))
        .merge(admin_router(services.admin.clone()))
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
