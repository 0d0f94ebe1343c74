//! Model manager endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use tcv_common::api_types::{CreateModelRequest, DeleteResponse, ModelListResponse, UpdateModelRequest};
use tcv_common::Model;
use tracing::info;

use crate::db::models;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

const NAME_REQUIRED: &str = "Model name is required";
const NOT_FOUND: &str = "Model not found";

/// Empty description means "no description"
fn normalize_description(description: Option<&str>) -> Option<&str> {
    description.map(str::trim).filter(|d| !d.is_empty())
}

/// GET /api/models
pub async fn list_models(State(state): State<AppState>) -> ApiResult<Json<ModelListResponse>> {
    Ok(Json(models::list_summaries(&state.db).await?))
}

/// POST /api/models
pub async fn create_model(
    State(state): State<AppState>,
    Json(request): Json<CreateModelRequest>,
) -> ApiResult<Json<Model>> {
    let name = request
        .model_name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .ok_or_else(|| ApiError::BadRequest(NAME_REQUIRED.to_string()))?;

    let model = models::create(&state.db, name, normalize_description(request.description.as_deref())).await?;
    info!("Created model {} ({})", model.model_name, model.id);
    Ok(Json(model))
}

/// PATCH /api/models/:id
pub async fn update_model(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateModelRequest>,
) -> ApiResult<Json<Model>> {
    let name = match request.model_name.as_deref().map(str::trim) {
        Some("") => return Err(ApiError::BadRequest(NAME_REQUIRED.to_string())),
        other => other,
    };
    let description = request
        .description
        .as_deref()
        .map(|d| normalize_description(Some(d)));

    models::update(&state.db, &id, name, description)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(NOT_FOUND.to_string()))
}

/// DELETE /api/models/:id
pub async fn delete_model(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<DeleteResponse>> {
    if !models::delete(&state.db, &id).await? {
        return Err(ApiError::NotFound(NOT_FOUND.to_string()));
    }
    info!("Deleted model {}", id);
    Ok(Json(DeleteResponse { success: true }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_description() {
        assert_eq!(normalize_description(Some("  cloud ")), Some("cloud"));
        assert_eq!(normalize_description(Some("   ")), None);
        assert_eq!(normalize_description(None), None);
    }
}
