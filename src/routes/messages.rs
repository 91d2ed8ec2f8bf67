use axum::{
    extract::{Path, State},
    response::{IntoResponse, Json},
    Extension,
};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::envelope::{created, ok},
    dto::message_dto::SendMessagePayload,
    error::Result,
    middleware::auth::Claims,
    models::message::CreateMessage,
    AppState,
};

#[axum::debug_handler]
pub async fn send(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<SendMessagePayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let message = state
        .message_service
        .send(CreateMessage {
            sender_id: claims.user_id()?,
            recipient_id: payload.recipient_id,
            job_id: payload.job_id,
            body: payload.body,
        })
        .await?;
    Ok(created(message))
}

#[axum::debug_handler]
pub async fn conversations(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let conversations = state
        .message_service
        .conversations(claims.user_id()?)
        .await?;
    Ok(ok(conversations))
}

#[axum::debug_handler]
pub async fn conversation(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(other_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let messages = state
        .message_service
        .conversation(claims.user_id()?, other_id)
        .await?;
    Ok(ok(messages))
}

#[axum::debug_handler]
pub async fn unread_count(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let count = state.message_service.unread_count(claims.user_id()?).await?;
    Ok(ok(json!({ "count": count })))
}
