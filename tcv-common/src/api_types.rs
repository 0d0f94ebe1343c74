//! Shared API request/response types
//!
//! Used by `tcv-server` to produce responses and by the `tcv` CLI to read
//! them. Entity rows keep their snake_case column names; envelope and
//! computed fields are camelCase.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::csv_row::CsvRow;
use crate::gallery::GalleryStats;
use crate::models::{Audio, Feedback, Model, ModelSummary, Transcription, TranscriptionView};

// ========================================
// Errors
// ========================================

/// Body of every non-2xx JSON response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

// ========================================
// Models
// ========================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateModelRequest {
    #[serde(default)]
    pub model_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Absent fields are left unchanged; an empty description clears it
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateModelRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

pub type ModelListResponse = Vec<ModelSummary>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub success: bool,
}

// ========================================
// Upload / audio listing
// ========================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadFailure {
    pub name: String,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UploadResults {
    pub success: Vec<String>,
    pub failed: Vec<UploadFailure>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub message: String,
    pub results: UploadResults,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioListResponse {
    pub audios: Vec<Audio>,
    pub stats: GalleryStats,
}

// ========================================
// Audio detail
// ========================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Navigation {
    #[serde(rename = "previousId")]
    pub previous_id: Option<String>,
    #[serde(rename = "nextId")]
    pub next_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioDetailResponse {
    pub audio: Audio,
    pub transcriptions: Vec<TranscriptionView>,
    #[serde(rename = "voteCounts")]
    pub vote_counts: BTreeMap<String, i64>,
    #[serde(rename = "totalVotes")]
    pub total_votes: i64,
    pub navigation: Navigation,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateAudioRequest {
    pub is_validated: bool,
}

// ========================================
// CSV import
// ========================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportCsvRequest {
    #[serde(default)]
    pub rows: Option<Vec<CsvRow>>,
    #[serde(default, rename = "modelId")]
    pub model_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportRowError {
    #[serde(rename = "audioName")]
    pub audio_name: String,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    /// Rows whose audio was found
    pub processed: usize,
    pub transcriptions_added: usize,
    /// Rows without an audio name or transcription text
    pub skipped: usize,
    pub audio_not_found: Vec<String>,
    pub errors: Vec<ImportRowError>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportCsvResponse {
    pub message: String,
    pub results: ImportReport,
}

// ========================================
// Feedback
// ========================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitFeedbackRequest {
    #[serde(default)]
    pub audio_id: Option<String>,
    #[serde(default)]
    pub preferred_transcription_id: Option<String>,
    #[serde(default)]
    pub user_comments: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitFeedbackResponse {
    pub message: String,
    pub feedback: Feedback,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackListResponse {
    pub feedback: Vec<Feedback>,
}

// ========================================
// Stats / debug
// ========================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationStats {
    pub audio_id: String,
    pub audio_name: String,
    pub language_tag: Option<String>,
    pub total_votes: i64,
    pub votes_by_model: BTreeMap<String, i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsResponse {
    pub stats: Vec<ValidationStats>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableDump<T> {
    pub count: usize,
    pub rows: Vec<T>,
}

impl<T> From<Vec<T>> for TableDump<T> {
    fn from(rows: Vec<T>) -> Self {
        Self { count: rows.len(), rows }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebugResponse {
    pub audios: TableDump<Audio>,
    pub models: TableDump<Model>,
    pub transcriptions: TableDump<Transcription>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_import_request_reads_camel_case_model_id() {
        let request: ImportCsvRequest = serde_json::from_value(json!({
            "rows": [{ "audio_name": "a.wav", "transcription": "salam" }],
            "modelId": "m1"
        }))
        .unwrap();
        assert_eq!(request.model_id.as_deref(), Some("m1"));
        assert_eq!(request.rows.unwrap().len(), 1);
    }

    #[test]
    fn test_import_report_field_names() {
        let report = ImportReport {
            processed: 2,
            transcriptions_added: 1,
            skipped: 0,
            audio_not_found: vec!["x.wav".to_string()],
            errors: vec![ImportRowError {
                audio_name: "y.wav".to_string(),
                error: "boom".to_string(),
            }],
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["transcriptionsAdded"], 1);
        assert_eq!(json["audioNotFound"][0], "x.wav");
        assert_eq!(json["errors"][0]["audioName"], "y.wav");
    }

    #[test]
    fn test_feedback_request_fields_optional() {
        let request: SubmitFeedbackRequest = serde_json::from_value(json!({})).unwrap();
        assert!(request.audio_id.is_none());

        let request: SubmitFeedbackRequest = serde_json::from_value(json!({
            "audioId": "a1",
            "preferredTranscriptionId": null,
            "userComments": "clear audio"
        }))
        .unwrap();
        assert_eq!(request.audio_id.as_deref(), Some("a1"));
        assert!(request.preferred_transcription_id.is_none());
    }
}
