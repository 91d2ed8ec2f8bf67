use axum::{extract::State, response::IntoResponse, Extension};

use crate::{dto::envelope::ok, error::Result, middleware::auth::Claims, AppState};

#[axum::debug_handler]
pub async fn employer(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let stats = state.analytics_service.employer(claims.user_id()?).await?;
    Ok(ok(stats))
}

#[axum::debug_handler]
pub async fn admin(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let stats = state.analytics_service.admin().await?;
    Ok(ok(stats))
}
