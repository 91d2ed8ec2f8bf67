use axum::{
    extract::{Multipart, Path, Query, State},
    response::IntoResponse,
    Extension, Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    config::get_config,
    dto::envelope::ok,
    dto::user_dto::{PublicProfile, UpdateProfilePayload, UserListQuery, UserProfile},
    error::{Error, Result},
    middleware::auth::Claims,
    utils::upload::{save_upload, UploadKind},
    AppState,
};

#[axum::debug_handler]
pub async fn me(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let user = state.user_service.get(claims.user_id()?).await?;
    Ok(ok(UserProfile::from(user)))
}

#[axum::debug_handler]
pub async fn update_me(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<UpdateProfilePayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let user = state
        .user_service
        .update_profile(claims.user_id()?, payload)
        .await?;
    Ok(ok(UserProfile::from(user)))
}

/// First file field of a multipart body as (filename, bytes).
pub(crate) async fn first_file(mut multipart: Multipart) -> Result<(String, Vec<u8>)> {
    while let Some(field) = multipart.next_field().await? {
        if let Some(filename) = field.file_name().map(str::to_string) {
            let data = field.bytes().await?;
            return Ok((filename, data.to_vec()));
        }
    }
    Err(Error::BadRequest("No file found in request".into()))
}

#[axum::debug_handler]
pub async fn upload_resume(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    multipart: Multipart,
) -> Result<impl IntoResponse> {
    let (filename, data) = first_file(multipart).await?;
    let url = save_upload(&get_config().uploads_dir, UploadKind::Resume, &filename, &data).await?;
    let user = state.user_service.set_resume_url(claims.user_id()?, &url).await?;
    Ok(ok(UserProfile::from(user)))
}

#[axum::debug_handler]
pub async fn upload_photo(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    multipart: Multipart,
) -> Result<impl IntoResponse> {
    let (filename, data) = first_file(multipart).await?;
    let url = save_upload(&get_config().uploads_dir, UploadKind::Photo, &filename, &data).await?;
    let user = state.user_service.set_photo_url(claims.user_id()?, &url).await?;
    Ok(ok(UserProfile::from(user)))
}

#[axum::debug_handler]
pub async fn public_profile(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let user = state.user_service.get(id).await?;
    Ok(ok(PublicProfile::from(user)))
}

#[axum::debug_handler]
pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<UserListQuery>,
) -> Result<impl IntoResponse> {
    let users = state.user_service.list(query).await?;
    Ok(ok(users.map(UserProfile::from)))
}
