//! CSV import endpoint

use axum::{extract::State, Json};
use tcv_common::api_types::{ImportCsvRequest, ImportCsvResponse};

use crate::db::models;
use crate::error::{ApiError, ApiResult};
use crate::import::import_rows;
use crate::AppState;

/// POST /api/import-csv
pub async fn import_csv(
    State(state): State<AppState>,
    Json(request): Json<ImportCsvRequest>,
) -> ApiResult<Json<ImportCsvResponse>> {
    let rows = request
        .rows
        .filter(|rows| !rows.is_empty())
        .ok_or_else(|| ApiError::BadRequest("No valid CSV data provided".to_string()))?;

    let model_id = request
        .model_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("Model ID is required".to_string()))?;

    if !models::exists(&state.db, &model_id).await? {
        return Err(ApiError::NotFound("Model not found".to_string()));
    }

    let results = import_rows(&state.db, &model_id, &rows).await;
    Ok(Json(ImportCsvResponse {
        message: "CSV import completed".to_string(),
        results,
    }))
}
