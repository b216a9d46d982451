use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use super::domain::{JobChanges, JobDraft, JobId};
use super::search::JobSearchFilters;
use super::service::{CatalogError, CatalogStore, JobCatalogService};
use crate::identity::{Caller, Role};
use crate::notifications::NotificationPublisher;

#[derive(Debug, Default, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<usize>,
}

/// Router builder exposing the job catalog.
pub fn catalog_router<S, N>(service: Arc<JobCatalogService<S, N>>) -> Router
where
    S: CatalogStore + 'static,
    N: NotificationPublisher + 'static,
{
    Router::new()
        .route(
            "/api/v1/jobs",
            post(create_handler::<S, N>).get(search_handler::<S, N>),
        )
        .route("/api/v1/jobs/featured", get(featured_handler::<S, N>))
        .route(
            "/api/v1/jobs/recommendations",
            get(recommendations_handler::<S, N>),
        )
        .route(
            "/api/v1/jobs/recommendations/notify",
            post(notify_matches_handler::<S, N>),
        )
        .route("/api/v1/jobs/stats", get(stats_handler::<S, N>))
        .route(
            "/api/v1/jobs/:job_id",
            get(get_handler::<S, N>)
                .patch(update_handler::<S, N>)
                .delete(delete_handler::<S, N>),
        )
        .route("/api/v1/jobs/:job_id/publish", post(publish_handler::<S, N>))
        .route("/api/v1/jobs/:job_id/pause", post(pause_handler::<S, N>))
        .route("/api/v1/jobs/:job_id/close", post(close_handler::<S, N>))
        .with_state(service)
}

pub(crate) async fn create_handler<S, N>(
    State(service): State<Arc<JobCatalogService<S, N>>>,
    caller: Caller,
    Json(draft): Json<JobDraft>,
) -> Result<Response, CatalogError>
where
    S: CatalogStore + 'static,
    N: NotificationPublisher + 'static,
{
    let job = service.create(&caller, draft)?;
    Ok((StatusCode::CREATED, Json(job)).into_response())
}

pub(crate) async fn search_handler<S, N>(
    State(service): State<Arc<JobCatalogService<S, N>>>,
    _caller: Caller,
    Query(filters): Query<JobSearchFilters>,
) -> Result<Response, CatalogError>
where
    S: CatalogStore + 'static,
    N: NotificationPublisher + 'static,
{
    let page = service.search(&filters)?;
    Ok(Json(page).into_response())
}

pub(crate) async fn featured_handler<S, N>(
    State(service): State<Arc<JobCatalogService<S, N>>>,
    _caller: Caller,
    Query(query): Query<LimitQuery>,
) -> Result<Response, CatalogError>
where
    S: CatalogStore + 'static,
    N: NotificationPublisher + 'static,
{
    let jobs = service.featured(query.limit)?;
    Ok(Json(jobs).into_response())
}

pub(crate) async fn recommendations_handler<S, N>(
    State(service): State<Arc<JobCatalogService<S, N>>>,
    caller: Caller,
    Query(query): Query<LimitQuery>,
) -> Result<Response, CatalogError>
where
    S: CatalogStore + 'static,
    N: NotificationPublisher + 'static,
{
    if !caller.is(Role::Student) {
        return Err(CatalogError::Forbidden(
            "recommendations are only available to students".to_string(),
        ));
    }
    let jobs = service.recommend(&caller.user_id, query.limit)?;
    Ok(Json(jobs).into_response())
}

/// Email the calling student their current matches; responds with the jobs sent.
pub(crate) async fn notify_matches_handler<S, N>(
    State(service): State<Arc<JobCatalogService<S, N>>>,
    caller: Caller,
    Query(query): Query<LimitQuery>,
) -> Result<Response, CatalogError>
where
    S: CatalogStore + 'static,
    N: NotificationPublisher + 'static,
{
    if !caller.is(Role::Student) {
        return Err(CatalogError::Forbidden(
            "job match digests are only available to students".to_string(),
        ));
    }
    let jobs = service.notify_matches(&caller.user_id, query.limit)?;
    Ok(Json(jobs).into_response())
}

pub(crate) async fn stats_handler<S, N>(
    State(service): State<Arc<JobCatalogService<S, N>>>,
    _caller: Caller,
) -> Result<Response, CatalogError>
where
    S: CatalogStore + 'static,
    N: NotificationPublisher + 'static,
{
    let stats = service.stats()?;
    Ok(Json(stats).into_response())
}

pub(crate) async fn get_handler<S, N>(
    State(service): State<Arc<JobCatalogService<S, N>>>,
    _caller: Caller,
    Path(job_id): Path<String>,
) -> Result<Response, CatalogError>
where
    S: CatalogStore + 'static,
    N: NotificationPublisher + 'static,
{
    let view = service.get(&JobId(job_id))?;
    Ok(Json(view).into_response())
}

pub(crate) async fn update_handler<S, N>(
    State(service): State<Arc<JobCatalogService<S, N>>>,
    caller: Caller,
    Path(job_id): Path<String>,
    Json(changes): Json<JobChanges>,
) -> Result<Response, CatalogError>
where
    S: CatalogStore + 'static,
    N: NotificationPublisher + 'static,
{
    let job = service.update(&JobId(job_id), changes, &caller)?;
    Ok(Json(job).into_response())
}

pub(crate) async fn delete_handler<S, N>(
    State(service): State<Arc<JobCatalogService<S, N>>>,
    caller: Caller,
    Path(job_id): Path<String>,
) -> Result<Response, CatalogError>
where
    S: CatalogStore + 'static,
    N: NotificationPublisher + 'static,
{
    service.delete(&JobId(job_id), &caller)?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

pub(crate) async fn publish_handler<S, N>(
    State(service): State<Arc<JobCatalogService<S, N>>>,
    caller: Caller,
    Path(job_id): Path<String>,
) -> Result<Response, CatalogError>
where
    S: CatalogStore + 'static,
    N: NotificationPublisher + 'static,
{
    let job = service.publish(&JobId(job_id), &caller)?;
    Ok(Json(job).into_response())
}

pub(crate) async fn pause_handler<S, N>(
    State(service): State<Arc<JobCatalogService<S, N>>>,
    caller: Caller,
    Path(job_id): Path<String>,
) -> Result<Response, CatalogError>
where
    S: CatalogStore + 'static,
    N: NotificationPublisher + 'static,
{
    let job = service.pause(&JobId(job_id), &caller)?;
    Ok(Json(job).into_response())
}

pub(crate) async fn close_handler<S, N>(
    State(service): State<Arc<JobCatalogService<S, N>>>,
    caller: Caller,
    Path(job_id): Path<String>,
) -> Result<Response, CatalogError>
where
    S: CatalogStore + 'static,
    N: NotificationPublisher + 'static,
{
    let job = service.close(&JobId(job_id), &caller)?;
    Ok(Json(job).into_response())
}
