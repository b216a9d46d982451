use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::report::ReportWindow;
use super::service::{AdminError, AdminService, AdminStore};
use super::users::{BulkUserAction, UserActionRequest};
use crate::audit::AuditFilter;
use crate::identity::{Caller, UserId};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Json,
    Csv,
}

#[derive(Debug, Default, Deserialize)]
pub struct ReportQuery {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    #[serde(default)]
    pub format: ReportFormat,
}

pub fn admin_router<S>(service: Arc<AdminService<S>>) -> Router
where
    S: AdminStore + 'static,
{
    Router::new()
        .route("/api/v1/admin/overview", get(overview_handler::<S>))
        .route("/api/v1/admin/reports/:kind", get(report_handler::<S>))
        .route("/api/v1/admin/audit", get(audit_handler::<S>))
        .route(
            "/api/v1/admin/users/bulk-action",
            post(bulk_user_action_handler::<S>),
        )
        .route(
            "/api/v1/admin/users/:user_id/action",
            post(user_action_handler::<S>),
        )
        .with_state(service)
}

pub(crate) async fn overview_handler<S>(
    State(service): State<Arc<AdminService<S>>>,
    caller: Caller,
) -> Result<Response, AdminError>
where
    S: AdminStore + 'static,
{
    let overview = service.overview(&caller)?;
    Ok(Json(overview).into_response())
}

pub(crate) async fn report_handler<S>(
    State(service): State<Arc<AdminService<S>>>,
    caller: Caller,
    Path(kind): Path<String>,
    Query(query): Query<ReportQuery>,
) -> Result<Response, AdminError>
where
    S: AdminStore + 'static,
{
    let window = ReportWindow {
        start: query.start,
        end: query.end,
    };
    match query.format {
        ReportFormat::Json => {
            let report = service.report(&caller, &kind, window)?;
            Ok(Json(report).into_response())
        }
        ReportFormat::Csv => {
            let body = service.report_csv(&caller, &kind, window)?;
            let disposition = format!("attachment; filename=\"{kind}.csv\"");
            Ok((
                [
                    (header::CONTENT_TYPE, "text/csv".to_string()),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                body,
            )
                .into_response())
        }
    }
}

pub(crate) async fn audit_handler<S>(
    State(service): State<Arc<AdminService<S>>>,
    caller: Caller,
    Query(filter): Query<AuditFilter>,
) -> Result<Response, AdminError>
where
    S: AdminStore + 'static,
{
    let entries = service.audit_trail(&caller, &filter)?;
    Ok(Json(entries).into_response())
}

pub(crate) async fn user_action_handler<S>(
    State(service): State<Arc<AdminService<S>>>,
    caller: Caller,
    Path(user_id): Path<String>,
    Json(request): Json<UserActionRequest>,
) -> Result<Response, AdminError>
where
    S: AdminStore + 'static,
{
    let account = service.manage_user(&caller, &UserId(user_id), &request)?;
    Ok(Json(account).into_response())
}

pub(crate) async fn bulk_user_action_handler<S>(
    State(service): State<Arc<AdminService<S>>>,
    caller: Caller,
    Json(bulk): Json<BulkUserAction>,
) -> Result<Response, AdminError>
where
    S: AdminStore + 'static,
{
    let summary = service.bulk_user_action(&caller, &bulk)?;
    Ok(Json(summary).into_response())
}
