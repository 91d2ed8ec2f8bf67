use axum::{
    extract::State,
    http::header,
    response::{AppendHeaders, IntoResponse},
    Json,
};
use serde_json::json;
use validator::Validate;

use crate::{
    config::get_config,
    dto::auth_dto::{EmailPayload, LoginPayload, RegisterPayload, VerifyOtpPayload},
    dto::envelope::{created, ok},
    error::Result,
    utils::cookie::{auth_cookie, clear_auth_cookie},
    AppState,
};

fn session_cookie(token: &str) -> String {
    let config = get_config();
    auth_cookie(
        token,
        config.jwt_expires_hours * 3600,
        config.client_url.starts_with("https://"),
    )
}

#[axum::debug_handler]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let registered = state.auth_service.register(payload).await?;
    Ok(created(registered))
}

#[axum::debug_handler]
pub async fn verify_otp(
    State(state): State<AppState>,
    Json(payload): Json<VerifyOtpPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let session = state.auth_service.verify_otp(&payload.email, &payload.otp).await?;
    let cookie = session_cookie(&session.token);
    Ok((AppendHeaders([(header::SET_COOKIE, cookie)]), ok(session)))
}

#[axum::debug_handler]
pub async fn resend_otp(
    State(state): State<AppState>,
    Json(payload): Json<EmailPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    state.auth_service.resend_otp(&payload.email).await?;
    Ok(ok(json!({ "message": "Verification code sent" })))
}

#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let session = state.auth_service.login(payload).await?;
    let cookie = session_cookie(&session.token);
    Ok((AppendHeaders([(header::SET_COOKIE, cookie)]), ok(session)))
}

pub async fn logout() -> impl IntoResponse {
    (
        AppendHeaders([(header::SET_COOKIE, clear_auth_cookie())]),
        ok(json!({ "message": "Logged out" })),
    )
}
