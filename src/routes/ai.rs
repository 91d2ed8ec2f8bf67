use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Extension,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    dto::envelope::ok,
    error::Result,
    middleware::auth::Claims,
    routes::actor_of,
    services::fit_service::FitService,
    AppState,
};

const CANDIDATE_POOL: i64 = 200;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct RecommendationQuery {
    pub limit: Option<usize>,
}

#[axum::debug_handler]
pub async fn fit_score(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(job_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let user = state.user_service.get(claims.user_id()?).await?;
    let job = state.job_service.get(job_id, Some(actor_of(&claims)?)).await?;
    Ok(ok(FitService::score_for(&user, &job)))
}

#[axum::debug_handler]
pub async fn recommendations(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<RecommendationQuery>,
) -> Result<impl IntoResponse> {
    let user = state.user_service.get(claims.user_id()?).await?;
    let jobs = state.job_service.list_open(CANDIDATE_POOL).await?;
    let limit = query.limit.unwrap_or(10).clamp(1, 50);
    Ok(ok(FitService::rank(&user, jobs, limit)))
}
