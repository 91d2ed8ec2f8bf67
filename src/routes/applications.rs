use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json},
    Extension,
};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::application_dto::{ApplicationListQuery, ApplyPayload, UpdateApplicationStatusPayload},
    dto::envelope::{created, ok},
    dto::job_dto::JobResponse,
    error::Result,
    middleware::auth::Claims,
    routes::actor_of,
    services::export_service::{ExportService, XLSX_CONTENT_TYPE},
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/jobs/{id}/apply",
    params(
        ("id" = Uuid, Path, description = "Job ID")
    ),
    request_body = ApplyPayload,
    responses(
        (status = 201, description = "Application submitted"),
        (status = 400, description = "Job closed or already applied"),
        (status = 404, description = "Job not found")
    )
)]
#[axum::debug_handler]
pub async fn apply(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(job_id): Path<Uuid>,
    payload: Option<Json<ApplyPayload>>,
) -> Result<impl IntoResponse> {
    let payload = payload.map(|Json(p)| p).unwrap_or_default();
    payload.validate()?;
    let application = state
        .application_service
        .apply(job_id, claims.user_id()?, payload)
        .await?;
    Ok(created(application))
}

#[axum::debug_handler]
pub async fn my_applications(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let applications = state.application_service.mine(claims.user_id()?).await?;
    Ok(ok(applications))
}

#[axum::debug_handler]
pub async fn get_application(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let application = state
        .application_service
        .get(id, actor_of(&claims)?)
        .await?;
    Ok(ok(application))
}

#[axum::debug_handler]
pub async fn list_for_job(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(job_id): Path<Uuid>,
    Query(query): Query<ApplicationListQuery>,
) -> Result<impl IntoResponse> {
    let (job, applications) = state
        .application_service
        .list_for_job(job_id, actor_of(&claims)?, query.status.as_deref())
        .await?;
    Ok(ok(json!({
        "job": JobResponse::from(job),
        "applications": applications,
    })))
}

#[axum::debug_handler]
pub async fn export_for_job(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(job_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let (job, applications) = state
        .application_service
        .list_for_job(job_id, actor_of(&claims)?, None)
        .await?;
    let bytes = ExportService::applicants_xlsx(&job.title, &applications)?;
    let disposition = format!("attachment; filename=\"applicants_{}.xlsx\"", job.id);

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    ))
}

#[utoipa::path(
    patch,
    path = "/api/applications/{id}/status",
    params(
        ("id" = Uuid, Path, description = "Application ID")
    ),
    request_body = UpdateApplicationStatusPayload,
    responses(
        (status = 200, description = "Status updated"),
        (status = 400, description = "Unknown status"),
        (status = 403, description = "Not the job owner")
    )
)]
#[axum::debug_handler]
pub async fn update_status(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateApplicationStatusPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let application = state
        .application_service
        .update_status(id, actor_of(&claims)?, payload)
        .await?;
    Ok(ok(application))
}

#[axum::debug_handler]
pub async fn withdraw(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    state
        .application_service
        .withdraw(id, claims.user_id()?)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
