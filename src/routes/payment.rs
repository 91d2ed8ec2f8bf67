use axum::{
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Json},
    Extension,
};
use bytes::Bytes;
use serde_json::json;
use validator::Validate;

use crate::{
    dto::envelope::{created, ok},
    dto::payment_dto::{ConfirmPaymentPayload, CreateIntentPayload},
    error::Result,
    middleware::auth::Claims,
    services::payment_service::PaymentService,
    AppState,
};

pub async fn plans() -> impl IntoResponse {
    ok(PaymentService::plans())
}

#[axum::debug_handler]
pub async fn create_intent(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateIntentPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let intent = state
        .payment_service
        .create_intent(claims.user_id()?, &payload.plan)
        .await?;
    Ok(created(intent))
}

#[axum::debug_handler]
pub async fn confirm(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<ConfirmPaymentPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let outcome = state
        .payment_service
        .confirm(claims.user_id()?, &payload.payment_intent_id)
        .await?;
    Ok(ok(outcome))
}

#[axum::debug_handler]
pub async fn history(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let payments = state.payment_service.history(claims.user_id()?).await?;
    Ok(ok(payments))
}

/// Raw body is required for the signature check.
#[axum::debug_handler]
pub async fn webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse> {
    let signature = headers
        .get("stripe-signature")
        .and_then(|v| v.to_str().ok());
    let applied = state.payment_service.handle_webhook(&body, signature).await?;
    Ok(ok(json!({ "received": true, "applied": applied })))
}
