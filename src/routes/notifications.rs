use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Extension,
};
use serde_json::json;
use uuid::Uuid;

use crate::{
    dto::envelope::{ok, Page, PageQuery},
    error::Result,
    middleware::auth::Claims,
    AppState,
};

#[axum::debug_handler]
pub async fn list(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse> {
    let notifications = state
        .notification_service
        .list(claims.user_id()?, Page::from(&query))
        .await?;
    Ok(ok(notifications))
}

#[axum::debug_handler]
pub async fn unread_count(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let count = state
        .notification_service
        .unread_count(claims.user_id()?)
        .await?;
    Ok(ok(json!({ "count": count })))
}

#[axum::debug_handler]
pub async fn mark_read(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let notification = state
        .notification_service
        .mark_read(id, claims.user_id()?)
        .await?;
    Ok(ok(notification))
}

#[axum::debug_handler]
pub async fn mark_all_read(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let updated = state
        .notification_service
        .mark_all_read(claims.user_id()?)
        .await?;
    Ok(ok(json!({ "updated": updated })))
}

#[axum::debug_handler]
pub async fn delete(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    state
        .notification_service
        .delete(id, claims.user_id()?)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
