use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Extension,
};
use serde_json::json;
use uuid::Uuid;

use crate::{
    dto::envelope::ok,
    error::Result,
    middleware::auth::Claims,
    routes::actor_of,
    AppState,
};

#[axum::debug_handler]
pub async fn generate(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(student_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let student = state
        .certificate_service
        .generate(student_id, actor_of(&claims)?)
        .await?;
    Ok(ok(student))
}

/// Public lookup; exposes only what a printed certificate shows.
#[axum::debug_handler]
pub async fn verify(
    State(state): State<AppState>,
    Path(certificate_id): Path<String>,
) -> Result<impl IntoResponse> {
    let student = state.certificate_service.verify(&certificate_id).await?;
    Ok(ok(json!({
        "valid": true,
        "certificate_id": student.certificate_id,
        "name": student.name,
        "course": student.course,
        "institution": student.institution,
        "grade": student.grade,
        "completion_date": student.completion_date,
        "issued_at": student.created_at,
        "has_pdf": student.pdf_path.is_some(),
    })))
}

#[axum::debug_handler]
pub async fn download(
    State(state): State<AppState>,
    Path(certificate_id): Path<String>,
) -> Result<impl IntoResponse> {
    let (bytes, file_name) = state.certificate_service.download(&certificate_id).await?;
    let disposition = format!("attachment; filename=\"{}\"", file_name);
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    ))
}
