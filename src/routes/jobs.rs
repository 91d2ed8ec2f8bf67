use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json},
    Extension,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::envelope::{created, ok},
    dto::job_dto::{
        CreateJobPayload, ExternalJob, ExternalJobQuery, JobListQuery, JobResponse,
        JobStatusPayload, UpdateJobPayload,
    },
    error::Result,
    middleware::auth::{optional_claims, Claims},
    routes::actor_of,
    AppState,
};

#[utoipa::path(
    get,
    path = "/api/jobs",
    params(JobListQuery),
    responses(
        (status = 200, description = "Paginated list of active jobs"),
        (status = 400, description = "Invalid query")
    )
)]
#[axum::debug_handler]
pub async fn list_jobs(
    State(state): State<AppState>,
    Query(query): Query<JobListQuery>,
) -> Result<impl IntoResponse> {
    let jobs = state.job_service.list(query).await?;
    Ok(ok(jobs.map(JobResponse::from)))
}

#[utoipa::path(
    get,
    path = "/api/jobs/{id}",
    params(
        ("id" = Uuid, Path, description = "Job ID")
    ),
    responses(
        (status = 200, description = "Job with its application count", body = JobResponse),
        (status = 404, description = "Job not found")
    )
)]
#[axum::debug_handler]
pub async fn get_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<impl IntoResponse> {
    let viewer = optional_claims(&headers)
        .map(|claims| actor_of(&claims))
        .transpose()?;
    let job = state.job_service.get(id, viewer).await?;
    Ok(ok(JobResponse::from(job)))
}

#[utoipa::path(
    post,
    path = "/api/jobs",
    request_body = CreateJobPayload,
    responses(
        (status = 201, description = "Job created", body = JobResponse),
        (status = 400, description = "Invalid payload"),
        (status = 403, description = "Caller is not an employer or does not own the company")
    )
)]
#[axum::debug_handler]
pub async fn create_job(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateJobPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let job = state.job_service.create(claims.user_id()?, payload).await?;
    Ok(created(JobResponse::from(job)))
}

#[utoipa::path(
    patch,
    path = "/api/jobs/{id}",
    params(
        ("id" = Uuid, Path, description = "Job ID")
    ),
    request_body = UpdateJobPayload,
    responses(
        (status = 200, description = "Job updated", body = JobResponse),
        (status = 400, description = "Invalid payload"),
        (status = 403, description = "Not the job owner"),
        (status = 404, description = "Job not found")
    )
)]
#[axum::debug_handler]
pub async fn update_job(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateJobPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let job = state
        .job_service
        .update(id, actor_of(&claims)?, payload)
        .await?;
    Ok(ok(JobResponse::from(job)))
}

#[utoipa::path(
    patch,
    path = "/api/jobs/{id}/status",
    params(
        ("id" = Uuid, Path, description = "Job ID")
    ),
    request_body = JobStatusPayload,
    responses(
        (status = 200, description = "Status changed", body = JobResponse),
        (status = 400, description = "Unknown status"),
        (status = 403, description = "Not the job owner")
    )
)]
#[axum::debug_handler]
pub async fn set_job_status(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(payload): Json<JobStatusPayload>,
) -> Result<impl IntoResponse> {
    let job = state
        .job_service
        .set_status(id, actor_of(&claims)?, &payload.status)
        .await?;
    Ok(ok(JobResponse::from(job)))
}

#[utoipa::path(
    delete,
    path = "/api/jobs/{id}",
    params(
        ("id" = Uuid, Path, description = "Job ID")
    ),
    responses(
        (status = 204, description = "Job deleted"),
        (status = 403, description = "Not the job owner"),
        (status = 404, description = "Job not found")
    )
)]
#[axum::debug_handler]
pub async fn delete_job(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    state.job_service.delete(id, actor_of(&claims)?).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[axum::debug_handler]
pub async fn my_jobs(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let jobs = state.job_service.mine(claims.user_id()?).await?;
    Ok(ok(jobs.into_iter().map(JobResponse::from).collect::<Vec<_>>()))
}

#[utoipa::path(
    get,
    path = "/api/jobs/external",
    params(ExternalJobQuery),
    responses(
        (status = 200, description = "Jobs from the external board", body = [ExternalJob]),
        (status = 502, description = "External board failed"),
        (status = 503, description = "External board not configured")
    )
)]
#[axum::debug_handler]
pub async fn external_jobs(
    State(state): State<AppState>,
    Query(query): Query<ExternalJobQuery>,
) -> Result<impl IntoResponse> {
    let jobs = state.external_job_service.search(query).await?;
    Ok(ok(jobs))
}
