use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Json, Router,
};

use super::domain::{ApplicationFilters, ApplicationId, ApplicationSubmission, BulkStatusUpdate, StatusUpdate};
use super::service::{ApplicationService, ApplicationServiceError, ApplicationStore};
use crate::identity::{Caller, Role};
use crate::notifications::NotificationPublisher;

/// Router builder exposing submission, review, and withdrawal endpoints.
pub fn application_router<S, N>(service: Arc<ApplicationService<S, N>>) -> Router
where
    S: ApplicationStore + 'static,
    N: NotificationPublisher + 'static,
{
    Router::new()
        .route(
            "/api/v1/applications",
            post(submit_handler::<S, N>).get(list_handler::<S, N>),
        )
        .route("/api/v1/applications/stats", get(stats_handler::<S, N>))
        .route(
            "/api/v1/applications/bulk-status",
            post(bulk_status_handler::<S, N>),
        )
        .route(
            "/api/v1/applications/:application_id",
            get(get_handler::<S, N>),
        )
        .route(
            "/api/v1/applications/:application_id/status",
            patch(update_status_handler::<S, N>),
        )
        .route(
            "/api/v1/applications/:application_id/withdraw",
            post(withdraw_handler::<S, N>),
        )
        .with_state(service)
}

pub(crate) async fn submit_handler<S, N>(
    State(service): State<Arc<ApplicationService<S, N>>>,
    caller: Caller,
    Json(submission): Json<ApplicationSubmission>,
) -> Result<Response, ApplicationServiceError>
where
    S: ApplicationStore + 'static,
    N: NotificationPublisher + 'static,
{
    let record = service.submit(&caller, submission)?;
    Ok((StatusCode::CREATED, Json(record)).into_response())
}

pub(crate) async fn list_handler<S, N>(
    State(service): State<Arc<ApplicationService<S, N>>>,
    caller: Caller,
    Query(filters): Query<ApplicationFilters>,
) -> Result<Response, ApplicationServiceError>
where
    S: ApplicationStore + 'static,
    N: NotificationPublisher + 'static,
{
    let page = service.list(&filters, &caller)?;
    Ok(Json(page).into_response())
}

pub(crate) async fn stats_handler<S, N>(
    State(service): State<Arc<ApplicationService<S, N>>>,
    caller: Caller,
) -> Result<Response, ApplicationServiceError>
where
    S: ApplicationStore + 'static,
    N: NotificationPublisher + 'static,
{
    let stats = service.stats(&caller)?;
    Ok(Json(stats).into_response())
}

pub(crate) async fn bulk_status_handler<S, N>(
    State(service): State<Arc<ApplicationService<S, N>>>,
    caller: Caller,
    Json(bulk): Json<BulkStatusUpdate>,
) -> Result<Response, ApplicationServiceError>
where
    S: ApplicationStore + 'static,
    N: NotificationPublisher + 'static,
{
    if caller.is(Role::Student) || caller.is(Role::UniversityAdmin) {
        return Err(ApplicationServiceError::Forbidden(
            "only recruiters and platform admins can update application status".to_string(),
        ));
    }
    let summary = service.bulk_update_status(bulk, &caller);
    Ok(Json(summary).into_response())
}

pub(crate) async fn get_handler<S, N>(
    State(service): State<Arc<ApplicationService<S, N>>>,
    caller: Caller,
    Path(application_id): Path<String>,
) -> Result<Response, ApplicationServiceError>
where
    S: ApplicationStore + 'static,
    N: NotificationPublisher + 'static,
{
    let record = service.get(&ApplicationId(application_id), &caller)?;
    Ok(Json(record).into_response())
}

pub(crate) async fn update_status_handler<S, N>(
    State(service): State<Arc<ApplicationService<S, N>>>,
    caller: Caller,
    Path(application_id): Path<String>,
    Json(update): Json<StatusUpdate>,
) -> Result<Response, ApplicationServiceError>
where
    S: ApplicationStore + 'static,
    N: NotificationPublisher + 'static,
{
    let record = service.update_status(&ApplicationId(application_id), update, &caller)?;
    Ok(Json(record).into_response())
}

pub(crate) async fn withdraw_handler<S, N>(
    State(service): State<Arc<ApplicationService<S, N>>>,
    caller: Caller,
    Path(application_id): Path<String>,
) -> Result<Response, ApplicationServiceError>
where
    S: ApplicationStore + 'static,
    N: NotificationPublisher + 'static,
{
    let record = service.withdraw(&ApplicationId(application_id), &caller)?;
    Ok(Json(record).into_response())
}
