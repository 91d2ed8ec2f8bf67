use axum::{response::IntoResponse, Json};
use utoipa::OpenApi;

use crate::dto::application_dto::{ApplyPayload, UpdateApplicationStatusPayload};
use crate::dto::job_dto::{
    CreateJobPayload, ExternalJob, JobResponse, JobStatusPayload, UpdateJobPayload,
};
use crate::routes::{applications, jobs};

#[derive(OpenApi)]
#[openapi(
    paths(
        jobs::list_jobs,
        jobs::get_job,
        jobs::create_job,
        jobs::update_job,
        jobs::set_job_status,
        jobs::delete_job,
        jobs::external_jobs,
        applications::apply,
        applications::update_status,
    ),
    components(schemas(
        JobResponse,
        CreateJobPayload,
        UpdateJobPayload,
        JobStatusPayload,
        ExternalJob,
        ApplyPayload,
        UpdateApplicationStatusPayload,
    )),
    tags((name = "jobs", description = "Job postings and applications"))
)]
pub struct ApiDoc;

pub async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}
