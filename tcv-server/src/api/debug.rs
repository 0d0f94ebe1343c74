//! Table dump for troubleshooting
//!
//! Disabled unless `enable_debug` is set; the route then answers 404 like an
//! unknown path.

use axum::{extract::State, Json};
use tcv_common::api_types::DebugResponse;

use crate::db::{audios, models, transcriptions};
use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// GET /api/debug
pub async fn debug_dump(State(state): State<AppState>) -> ApiResult<Json<DebugResponse>> {
    if !state.config.enable_debug {
        return Err(ApiError::NotFound("Not found".to_string()));
    }

    Ok(Json(DebugResponse {
        audios: audios::dump(&state.db).await?.into(),
        models: models::dump(&state.db).await?.into(),
        transcriptions: transcriptions::dump(&state.db).await?.into(),
    }))
}
