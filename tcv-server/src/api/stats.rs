//! Validation statistics endpoint

use axum::{extract::State, Json};
use tcv_common::api_types::StatsResponse;

use crate::db::stats;
use crate::error::ApiResult;
use crate::AppState;

/// GET /api/stats
pub async fn validation_stats(State(state): State<AppState>) -> ApiResult<Json<StatsResponse>> {
    let stats = stats::validation_stats(&state.db).await?;
    Ok(Json(StatsResponse { stats }))
}
