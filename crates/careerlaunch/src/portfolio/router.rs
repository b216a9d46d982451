use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Json, Router,
};

use super::domain::{
    PortfolioChanges, PortfolioDraft, PortfolioId, PortfolioSearch, ProjectChanges, ProjectDraft,
    ProjectId, SyncRequest,
};
use super::provider::RepositoryProvider;
use super::service::{PortfolioError, PortfolioService, PortfolioStore};
use crate::identity::Caller;

/// Router builder exposing portfolio management and sync endpoints.
pub fn portfolio_router<S, P>(service: Arc<PortfolioService<S, P>>) -> Router
where
    S: PortfolioStore + 'static,
    P: RepositoryProvider + 'static,
{
    Router::new()
        .route(
            "/api/v1/portfolios",
            post(create_handler::<S, P>).get(list_mine_handler::<S, P>),
        )
        .route("/api/v1/portfolios/search", get(search_handler::<S, P>))
        .route(
            "/api/v1/portfolios/:portfolio_id",
            get(get_handler::<S, P>)
                .patch(update_handler::<S, P>)
                .delete(delete_handler::<S, P>),
        )
        .route(
            "/api/v1/portfolios/:portfolio_id/sync",
            post(sync_handler::<S, P>),
        )
        .route(
            "/api/v1/portfolios/:portfolio_id/projects",
            post(create_project_handler::<S, P>).get(list_projects_handler::<S, P>),
        )
        .route(
            "/api/v1/projects/:project_id",
            patch(update_project_handler::<S, P>).delete(delete_project_handler::<S, P>),
        )
        .with_state(service)
}

pub(crate) async fn create_handler<S, P>(
    State(service): State<Arc<PortfolioService<S, P>>>,
    caller: Caller,
    Json(draft): Json<PortfolioDraft>,
) -> Result<Response, PortfolioError>
where
    S: PortfolioStore + 'static,
    P: RepositoryProvider + 'static,
{
    let portfolio = service.create(&caller, draft)?;
    Ok((StatusCode::CREATED, Json(portfolio)).into_response())
}

pub(crate) async fn list_mine_handler<S, P>(
    State(service): State<Arc<PortfolioService<S, P>>>,
    caller: Caller,
) -> Result<Response, PortfolioError>
where
    S: PortfolioStore + 'static,
    P: RepositoryProvider + 'static,
{
    let portfolios = service.list_for_student(&caller.user_id)?;
    Ok(Json(portfolios).into_response())
}

pub(crate) async fn search_handler<S, P>(
    State(service): State<Arc<PortfolioService<S, P>>>,
    _caller: Caller,
    Query(query): Query<PortfolioSearch>,
) -> Result<Response, PortfolioError>
where
    S: PortfolioStore + 'static,
    P: RepositoryProvider + 'static,
{
    let page = service.search(&query)?;
    Ok(Json(page).into_response())
}

pub(crate) async fn get_handler<S, P>(
    State(service): State<Arc<PortfolioService<S, P>>>,
    caller: Caller,
    Path(portfolio_id): Path<String>,
) -> Result<Response, PortfolioError>
where
    S: PortfolioStore + 'static,
    P: RepositoryProvider + 'static,
{
    let portfolio = service.get(&PortfolioId(portfolio_id), &caller)?;
    Ok(Json(portfolio).into_response())
}

pub(crate) async fn update_handler<S, P>(
    State(service): State<Arc<PortfolioService<S, P>>>,
    caller: Caller,
    Path(portfolio_id): Path<String>,
    Json(changes): Json<PortfolioChanges>,
) -> Result<Response, PortfolioError>
where
    S: PortfolioStore + 'static,
    P: RepositoryProvider + 'static,
{
    let portfolio = service.update(&PortfolioId(portfolio_id), changes, &caller)?;
    Ok(Json(portfolio).into_response())
}

pub(crate) async fn delete_handler<S, P>(
    State(service): State<Arc<PortfolioService<S, P>>>,
    caller: Caller,
    Path(portfolio_id): Path<String>,
) -> Result<Response, PortfolioError>
where
    S: PortfolioStore + 'static,
    P: RepositoryProvider + 'static,
{
    service.delete(&PortfolioId(portfolio_id), &caller)?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

pub(crate) async fn sync_handler<S, P>(
    State(service): State<Arc<PortfolioService<S, P>>>,
    caller: Caller,
    Path(portfolio_id): Path<String>,
    Json(request): Json<SyncRequest>,
) -> Result<Response, PortfolioError>
where
    S: PortfolioStore + 'static,
    P: RepositoryProvider + 'static,
{
    let report = service
        .sync(&PortfolioId(portfolio_id), request, &caller)
        .await?;
    Ok(Json(report).into_response())
}

pub(crate) async fn create_project_handler<S, P>(
    State(service): State<Arc<PortfolioService<S, P>>>,
    caller: Caller,
    Path(portfolio_id): Path<String>,
    Json(draft): Json<ProjectDraft>,
) -> Result<Response, PortfolioError>
where
    S: PortfolioStore + 'static,
    P: RepositoryProvider + 'static,
{
    let project = service.create_project(&PortfolioId(portfolio_id), draft, &caller)?;
    Ok((StatusCode::CREATED, Json(project)).into_response())
}

pub(crate) async fn list_projects_handler<S, P>(
    State(service): State<Arc<PortfolioService<S, P>>>,
    caller: Caller,
    Path(portfolio_id): Path<String>,
) -> Result<Response, PortfolioError>
where
    S: PortfolioStore + 'static,
    P: RepositoryProvider + 'static,
{
    let projects = service.list_projects(&PortfolioId(portfolio_id), &caller)?;
    Ok(Json(projects).into_response())
}

pub(crate) async fn update_project_handler<S, P>(
    State(service): State<Arc<PortfolioService<S, P>>>,
    caller: Caller,
    Path(project_id): Path<String>,
    Json(changes): Json<ProjectChanges>,
) -> Result<Response, PortfolioError>
where
    S: PortfolioStore + 'static,
    P: RepositoryProvider + 'static,
{
    let project = service.update_project(&ProjectId(project_id), changes, &caller)?;
    Ok(Json(project).into_response())
}

pub(crate) async fn delete_project_handler<S, P>(
    State(service): State<Arc<PortfolioService<S, P>>>,
    caller: Caller,
    Path(project_id): Path<String>,
) -> Result<Response, PortfolioError>
where
    S: PortfolioStore + 'static,
    P: RepositoryProvider + 'static,
{
    service.delete_project(&ProjectId(project_id), &caller)?;
    Ok(StatusCode::NO_CONTENT.into_response())
}
