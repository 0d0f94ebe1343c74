//! Audio upload and gallery listing
//!
//! Each file is stored as a blob first, then recorded as an `audios` row. If
//! the row insert fails the blob is deleted again.

use axum::{
    body::Bytes,
    extract::{multipart::MultipartError, Multipart, Query, State},
    Json,
};
use serde::Deserialize;
use tcv_common::api_types::{AudioListResponse, UploadFailure, UploadResponse, UploadResults};
use tcv_common::gallery::{filter_audios, GalleryStats, StatusFilter};
use tcv_common::time;
use tracing::{error, info, warn};

use crate::db::audios::{self, NewAudio};
use crate::error::{ApiError, ApiResult};
use crate::storage::{upload_path, StorageError};
use crate::AppState;

/// Multipart field carrying the files
const FILES_FIELD: &str = "files";

pub const ALLOWED_MIME_TYPES: &[&str] = &["audio/wav", "audio/mpeg", "audio/mp3", "audio/x-wav"];

struct IncomingFile {
    name: String,
    content_type: String,
    bytes: Bytes,
}

/// POST /api/upload
pub async fn upload_audio(State(state): State<AppState>, mut multipart: Multipart) -> ApiResult<Json<UploadResponse>> {
    let request_limit = state.config.max_request_bytes;
    let multipart_err = |e: MultipartError| ApiError::from_multipart(e, request_limit);

    let mut files = Vec::new();
    while let Some(field) = multipart.next_field().await.map_err(multipart_err)? {
        if field.name() != Some(FILES_FIELD) {
            continue;
        }
        let name = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().unwrap_or_default().to_string();
        let bytes = field.bytes().await.map_err(multipart_err)?;
        files.push(IncomingFile { name, content_type, bytes });
    }

    if files.is_empty() {
        return Err(ApiError::BadRequest("No files provided".to_string()));
    }

    let total = files.len();
    let mut results = UploadResults::default();
    for file in files {
        match store_file(&state, &file).await {
            Ok(()) => results.success.push(file.name),
            Err(error) => results.failed.push(UploadFailure { name: file.name, error }),
        }
    }

    info!("Upload finished: {} of {} files stored", results.success.len(), total);
    Ok(Json(UploadResponse {
        message: format!("Uploaded {} of {} files", results.success.len(), total),
        results,
    }))
}

/// Validate, write the blob, then insert the row; the error string is what
/// the client sees for this file
async fn store_file(state: &AppState, file: &IncomingFile) -> Result<(), String> {
    if !ALLOWED_MIME_TYPES.contains(&file.content_type.as_str()) {
        return Err(format!(
            "Invalid file type: {}. Only .wav and .mp3 are allowed.",
            file.content_type
        ));
    }

    let max_bytes = state.config.max_file_bytes;
    if file.bytes.len() > max_bytes {
        return Err(format!(
            "File too large: {} bytes exceeds the {} byte limit",
            file.bytes.len(),
            max_bytes
        ));
    }

    let bucket = state.config.bucket.as_str();
    let path = put_blob(state, bucket, file).await.map_err(|e| {
        warn!("Blob write failed for {}: {}", file.name, e);
        e.to_string()
    })?;

    let storage_url = state.store.public_url(bucket, &path);
    let new_audio = NewAudio {
        audio_name: &file.name,
        storage_url: &storage_url,
        storage_path: &path,
        language_tag: Some(state.config.default_language_tag.as_str()),
        file_size_bytes: i64::try_from(file.bytes.len()).ok(),
        mime_type: Some(file.content_type.as_str()),
    };

    match audios::insert(&state.db, &new_audio).await {
        Ok(audio) => {
            info!("Stored audio {} as {} ({})", file.name, path, audio.id);
            Ok(())
        }
        Err(e) => {
            warn!("Audio insert failed for {}, removing blob {}: {}", file.name, path, e);
            if let Err(remove_err) = state.store.remove(bucket, &path).await {
                error!("Failed to remove orphan blob {}/{}: {}", bucket, path, remove_err);
            }
            Err(e.to_string())
        }
    }
}

/// Attempts at a fresh timestamp when two uploads of the same name land in
/// the same millisecond
const PATH_ATTEMPTS: i64 = 5;

/// Write the blob under a new timestamped path and return that path
async fn put_blob(state: &AppState, bucket: &str, file: &IncomingFile) -> Result<String, StorageError> {
    let millis = time::unix_millis();
    let mut attempt = 0;
    loop {
        let path = upload_path(&file.name, millis + attempt);
        match state.store.put(bucket, &path, &file.bytes, &file.content_type).await {
            Ok(()) => return Ok(path),
            Err(StorageError::AlreadyExists(_)) if attempt + 1 < PATH_ATTEMPTS => attempt += 1,
            Err(e) => return Err(e),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct GalleryQuery {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// GET /api/upload
pub async fn list_audios(
    State(state): State<AppState>,
    Query(query): Query<GalleryQuery>,
) -> ApiResult<Json<AudioListResponse>> {
    let status: StatusFilter = query
        .status
        .as_deref()
        .unwrap_or_default()
        .parse()
        .map_err(ApiError::BadRequest)?;

    let all = audios::list(&state.db).await?;
    let stats = GalleryStats::from_audios(&all);
    let filtered = filter_audios(&all, query.search.as_deref().unwrap_or_default(), status)
        .into_iter()
        .cloned()
        .collect();

    Ok(Json(AudioListResponse { audios: filtered, stats }))
}
