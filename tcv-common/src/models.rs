//! Entity models
//!
//! Row shapes of the four persisted tables. Field names match the column
//! names and are serialized as-is (snake_case), which is what API clients
//! see for entity rows.

use serde::{Deserialize, Serialize};

/// An uploaded recording
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Audio {
    pub id: String,
    pub audio_name: String,
    pub storage_url: String,
    pub storage_path: String,
    pub language_tag: Option<String>,
    pub duration_seconds: Option<f64>,
    pub file_size_bytes: Option<i64>,
    pub mime_type: Option<String>,
    pub is_validated: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// A named transcription source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Model {
    pub id: String,
    pub model_name: String,
    pub description: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Listing projection of a model (`GET /api/models`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ModelSummary {
    pub id: String,
    pub model_name: String,
    pub description: Option<String>,
}

/// Text produced by one model for one audio
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Transcription {
    pub id: String,
    pub audio_id: String,
    pub model_id: String,
    pub text: String,
    pub bleu_score: Option<f64>,
    pub chrf_score: Option<f64>,
    pub word_count: Option<i64>,
    pub created_at: String,
    pub updated_at: String,
}

/// One reviewer's vote and/or comment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Feedback {
    pub id: String,
    pub audio_id: String,
    pub preferred_transcription_id: Option<String>,
    pub user_comments: Option<String>,
    pub user_identifier: Option<String>,
    pub session_id: Option<String>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: String,
}

/// Transcription joined with its model and the computed vote share
///
/// Entity columns stay snake_case; the computed fields are camelCase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptionView {
    #[serde(flatten)]
    pub transcription: Transcription,
    pub model: Model,
    #[serde(rename = "voteCount")]
    pub vote_count: i64,
    #[serde(rename = "votePercentage")]
    pub vote_percentage: i64,
    #[serde(rename = "isLeading")]
    pub is_leading: bool,
}

/// Number of whitespace-separated words in a transcription text
pub fn word_count(text: &str) -> i64 {
    text.split_whitespace().count() as i64
}
