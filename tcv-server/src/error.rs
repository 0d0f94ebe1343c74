//! Error types for tcv-server
//!
//! Outward categories: validation (400), not found (404), oversized upload
//! (413), and everything else (500) with the underlying message passed through.

use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tcv_common::api_types::ErrorResponse;
use thiserror::Error;

use crate::storage::StorageError;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or invalid request field (400)
    #[error("{0}")]
    BadRequest(String),

    /// Resource not found (404)
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Database(#[from] sqlx::Error),

    #[error("{0}")]
    Storage(#[from] StorageError),

    /// Upload body over the whole-request limit (413)
    #[error("Upload request too large: exceeds the {0} byte request limit")]
    PayloadTooLarge(usize),

    /// Malformed multipart body
    #[error("{0}")]
    Multipart(#[from] MultipartError),

    #[error("{0}")]
    Common(tcv_common::Error),
}

impl From<tcv_common::Error> for ApiError {
    fn from(err: tcv_common::Error) -> Self {
        match err {
            tcv_common::Error::NotFound(msg) => ApiError::NotFound(msg),
            tcv_common::Error::InvalidInput(msg) => ApiError::BadRequest(msg),
            other => ApiError::Common(other),
        }
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Multipart(err) => err.status(),
            ApiError::Database(_)
            | ApiError::Storage(_)
            | ApiError::Common(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }

        let body = Json(ErrorResponse {
            error: self.to_string(),
        });
        (status, body).into_response()
    }
}

impl ApiError {
    /// Multipart read failure, naming the limit when the body was too large
    pub fn from_multipart(err: MultipartError, request_limit: usize) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge(request_limit)
        } else {
            ApiError::Multipart(err)
        }
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
