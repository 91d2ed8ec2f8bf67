use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::company_dto::{CreateCompanyPayload, UpdateCompanyPayload},
    dto::envelope::{created, ok},
    error::Result,
    middleware::auth::Claims,
    routes::actor_of,
    AppState,
};

#[axum::debug_handler]
pub async fn create_company(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateCompanyPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let company = state
        .company_service
        .create(claims.user_id()?, payload)
        .await?;
    Ok(created(company))
}

#[axum::debug_handler]
pub async fn my_companies(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let companies = state.company_service.mine(claims.user_id()?).await?;
    Ok(ok(companies))
}

#[axum::debug_handler]
pub async fn get_company(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let company = state.company_service.get(id, actor_of(&claims)?).await?;
    Ok(ok(company))
}

#[axum::debug_handler]
pub async fn update_company(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCompanyPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let company = state
        .company_service
        .update(id, actor_of(&claims)?, payload)
        .await?;
    Ok(ok(company))
}

#[axum::debug_handler]
pub async fn delete_company(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    state.company_service.delete(id, actor_of(&claims)?).await?;
    Ok(StatusCode::NO_CONTENT)
}
