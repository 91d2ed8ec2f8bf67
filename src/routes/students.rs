use axum::{
    extract::{Multipart, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json},
    Extension,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::envelope::{created, ok, Page, PageQuery},
    dto::student_dto::CreateStudentPayload,
    error::Result,
    middleware::auth::Claims,
    routes::{actor_of, users::first_file},
    services::export_service::{ExportService, XLSX_CONTENT_TYPE},
    utils::upload::{check_upload, UploadKind},
    AppState,
};

#[axum::debug_handler]
pub async fn import_students(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    multipart: Multipart,
) -> Result<impl IntoResponse> {
    let (filename, data) = first_file(multipart).await?;
    check_upload(UploadKind::Spreadsheet, &filename, &data)?;
    let report = state
        .import_service
        .import(claims.user_id()?, &data)
        .await?;
    Ok(ok(report))
}

pub async fn import_template() -> Result<impl IntoResponse> {
    let bytes = ExportService::student_template_xlsx()?;
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, XLSX_CONTENT_TYPE),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"students_template.xlsx\"",
            ),
        ],
        bytes,
    ))
}

#[axum::debug_handler]
pub async fn create_student(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateStudentPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let student = state
        .student_service
        .create(claims.user_id()?, payload.into())
        .await?;
    Ok(created(student))
}

#[axum::debug_handler]
pub async fn list_students(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse> {
    let students = state
        .student_service
        .list(actor_of(&claims)?, Page::from(&query))
        .await?;
    Ok(ok(students))
}

#[axum::debug_handler]
pub async fn delete_student(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    state.student_service.delete(id, actor_of(&claims)?).await?;
    Ok(StatusCode::NO_CONTENT)
}
