//! tcv-server library - crowdsourced transcription comparison
//!
//! Reviewers listen to an uploaded recording, compare the transcriptions
//! produced by several models, and vote for the best one. Admins upload audio,
//! import transcriptions from CSV, and manage the model list.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, patch, post};
use axum::Router;
use sqlx::SqlitePool;
use std::sync::Arc;
use tcv_common::config::ServerConfig;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

pub mod api;
pub mod db;
pub mod error;
pub mod import;
pub mod session;
pub mod storage;

use storage::BlobStore;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    /// Blob store holding the uploaded audio
    pub store: Arc<dyn BlobStore>,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(db: SqlitePool, store: Arc<dyn BlobStore>, config: ServerConfig) -> Self {
        Self {
            db,
            store,
            config: Arc::new(config),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    let upload_limit = DefaultBodyLimit::max(state.config.max_request_bytes);

    let routes = Router::new()
        .route("/api/models", get(api::list_models).post(api::create_model))
        .route("/api/models/:id", patch(api::update_model).delete(api::delete_model))
        .route(
            "/api/upload",
            get(api::list_audios).post(api::upload_audio).layer(upload_limit),
        )
        .route("/api/audio/:id", get(api::get_audio_detail).patch(api::update_audio))
        .route("/api/import-csv", post(api::import_csv))
        .route("/api/feedback", get(api::list_feedback).post(api::submit_feedback))
        .route("/api/stats", get(api::validation_stats))
        .route("/api/debug", get(api::debug_dump))
        .merge(api::health_routes());

    let mut app = routes.with_state(state.clone());

    if let Some(root) = state.store.local_root() {
        app = app.nest_service("/storage", ServeDir::new(root));
    }

    app.layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
