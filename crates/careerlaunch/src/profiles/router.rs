use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};

use super::domain::{
    CompanyChanges, CompanyDraft, CompanySearch, PreferenceChanges, RecruiterLink,
    StudentProfileChanges, VerificationDecision,
};
use super::service::{ProfileError, ProfileService, ProfileStore};
use crate::identity::{Caller, CompanyId, UserId};

/// Router builder for student profiles, employers, and self-service account state.
pub fn profile_router<S>(service: Arc<ProfileService<S>>) -> Router
where
    S: ProfileStore + 'static,
{
    Router::new()
        .route(
            "/api/v1/students/me",
            get(student_profile_handler::<S>).patch(update_student_profile_handler::<S>),
        )
        .route(
            "/api/v1/students/me/preferences",
            put(update_preferences_handler::<S>),
        )
        .route(
            "/api/v1/companies",
            post(create_company_handler::<S>).get(search_companies_handler::<S>),
        )
        .route(
            "/api/v1/companies/:company_id",
            get(get_company_handler::<S>).patch(update_company_handler::<S>),
        )
        .route(
            "/api/v1/companies/:company_id/verification",
            put(verify_company_handler::<S>),
        )
        .route(
            "/api/v1/recruiters/:user_id/company",
            put(link_recruiter_handler::<S>),
        )
        .route(
            "/api/v1/account/deactivate",
            post(deactivate_handler::<S>),
        )
        .route(
            "/api/v1/account/reactivate",
            post(reactivate_handler::<S>),
        )
        .with_state(service)
}

async fn student_profile_handler<S>(
    State(service): State<Arc<ProfileService<S>>>,
    caller: Caller,
) -> Result<Response, ProfileError>
where
    S: ProfileStore + 'static,
{
    let profile = service.student_profile(&caller)?;
    Ok(Json(profile).into_response())
}

async fn update_student_profile_handler<S>(
    State(service): State<Arc<ProfileService<S>>>,
    caller: Caller,
    Json(changes): Json<StudentProfileChanges>,
) -> Result<Response, ProfileError>
where
    S: ProfileStore + 'static,
{
    let profile = service.update_student_profile(&caller, changes)?;
    Ok(Json(profile).into_response())
}

async fn update_preferences_handler<S>(
    State(service): State<Arc<ProfileService<S>>>,
    caller: Caller,
    Json(changes): Json<PreferenceChanges>,
) -> Result<Response, ProfileError>
where
    S: ProfileStore + 'static,
{
    let profile = service.update_preferences(&caller, changes)?;
    Ok(Json(profile.preferences).into_response())
}

async fn create_company_handler<S>(
    State(service): State<Arc<ProfileService<S>>>,
    caller: Caller,
    Json(draft): Json<CompanyDraft>,
) -> Result<Response, ProfileError>
where
    S: ProfileStore + 'static,
{
    let company = service.create_company(&caller, draft)?;
    Ok((StatusCode::CREATED, Json(company)).into_response())
}

async fn search_companies_handler<S>(
    State(service): State<Arc<ProfileService<S>>>,
    _caller: Caller,
    Query(query): Query<CompanySearch>,
) -> Result<Response, ProfileError>
where
    S: ProfileStore + 'static,
{
    let page = service.search_companies(&query)?;
    Ok(Json(page).into_response())
}

async fn get_company_handler<S>(
    State(service): State<Arc<ProfileService<S>>>,
    _caller: Caller,
    Path(company_id): Path<String>,
) -> Result<Response, ProfileError>
where
    S: ProfileStore + 'static,
{
    let company = service.get_company(&CompanyId(company_id))?;
    Ok(Json(company).into_response())
}

async fn update_company_handler<S>(
    State(service): State<Arc<ProfileService<S>>>,
    caller: Caller,
    Path(company_id): Path<String>,
    Json(changes): Json<CompanyChanges>,
) -> Result<Response, ProfileError>
where
    S: ProfileStore + 'static,
{
    let company = service.update_company(&caller, &CompanyId(company_id), changes)?;
    Ok(Json(company).into_response())
}

async fn verify_company_handler<S>(
    State(service): State<Arc<ProfileService<S>>>,
    caller: Caller,
    Path(company_id): Path<String>,
    Json(decision): Json<VerificationDecision>,
) -> Result<Response, ProfileError>
where
    S: ProfileStore + 'static,
{
    let company = service.verify_company(&caller, &CompanyId(company_id), decision)?;
    Ok(Json(company).into_response())
}

async fn link_recruiter_handler<S>(
    State(service): State<Arc<ProfileService<S>>>,
    caller: Caller,
    Path(user_id): Path<String>,
    Json(link): Json<RecruiterLink>,
) -> Result<Response, ProfileError>
where
    S: ProfileStore + 'static,
{
    let profile = service.link_recruiter(&caller, &UserId::new(user_id), link)?;
    Ok(Json(profile).into_response())
}

async fn deactivate_handler<S>(
    State(service): State<Arc<ProfileService<S>>>,
    caller: Caller,
) -> Result<Response, ProfileError>
where
    S: ProfileStore + 'static,
{
    let account = service.deactivate_account(&caller)?;
    Ok(Json(account).into_response())
}

async fn reactivate_handler<S>(
    State(service): State<Arc<ProfileService<S>>>,
    caller: Caller,
) -> Result<Response, ProfileError>
where
    S: ProfileStore + 'static,
{
    let account = service.reactivate_account(&caller)?;
    Ok(Json(account).into_response())
}
