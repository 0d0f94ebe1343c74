//! Table schema definitions
//!
//! Single source of truth for the four tables. `init_database` creates each
//! table from these definitions and appends columns added here later.

use crate::db::schema_sync::{sync_table, ColumnDefinition, TableSchema};
use crate::Result;
use sqlx::SqlitePool;

fn timestamp(name: &str) -> ColumnDefinition {
    ColumnDefinition::new(name, "TEXT").not_null()
}

/// Uploaded recordings
pub struct AudiosTableSchema;

impl TableSchema for AudiosTableSchema {
    fn table_name() -> &'static str {
        "audios"
    }

    fn expected_columns() -> Vec<ColumnDefinition> {
        vec![
            ColumnDefinition::new("id", "TEXT").primary_key(),
            ColumnDefinition::new("audio_name", "TEXT").not_null(),
            ColumnDefinition::new("storage_url", "TEXT").not_null(),
            ColumnDefinition::new("storage_path", "TEXT").not_null(),
            ColumnDefinition::new("language_tag", "TEXT"),
            ColumnDefinition::new("duration_seconds", "REAL"),
            ColumnDefinition::new("file_size_bytes", "INTEGER"),
            ColumnDefinition::new("mime_type", "TEXT"),
            ColumnDefinition::new("is_validated", "INTEGER").not_null().default("0"),
            timestamp("created_at"),
            timestamp("updated_at"),
        ]
    }
}

/// Transcription sources
pub struct ModelsTableSchema;

impl TableSchema for ModelsTableSchema {
    fn table_name() -> &'static str {
        "models"
    }

    fn expected_columns() -> Vec<ColumnDefinition> {
        vec![
            ColumnDefinition::new("id", "TEXT").primary_key(),
            ColumnDefinition::new("model_name", "TEXT").not_null(),
            ColumnDefinition::new("description", "TEXT"),
            timestamp("created_at"),
            timestamp("updated_at"),
        ]
    }
}

/// One model's text per audio; re-import upserts on (audio_id, model_id)
pub struct TranscriptionsTableSchema;

impl TableSchema for TranscriptionsTableSchema {
    fn table_name() -> &'static str {
        "transcriptions"
    }

    fn expected_columns() -> Vec<ColumnDefinition> {
        vec![
            ColumnDefinition::new("id", "TEXT").primary_key(),
            ColumnDefinition::new("audio_id", "TEXT")
                .not_null()
                .references("audios(id) ON DELETE CASCADE"),
            ColumnDefinition::new("model_id", "TEXT")
                .not_null()
                .references("models(id) ON DELETE CASCADE"),
            ColumnDefinition::new("text", "TEXT").not_null(),
            ColumnDefinition::new("bleu_score", "REAL"),
            ColumnDefinition::new("chrf_score", "REAL"),
            ColumnDefinition::new("word_count", "INTEGER"),
            timestamp("created_at"),
            timestamp("updated_at"),
        ]
    }

    fn table_constraints() -> Vec<String> {
        vec!["UNIQUE (audio_id, model_id)".to_string()]
    }
}

/// Append-only reviewer votes and comments
pub struct FeedbackTableSchema;

impl TableSchema for FeedbackTableSchema {
    fn table_name() -> &'static str {
        "feedback"
    }

    fn expected_columns() -> Vec<ColumnDefinition> {
        vec![
            ColumnDefinition::new("id", "TEXT").primary_key(),
            ColumnDefinition::new("audio_id", "TEXT")
                .not_null()
                .references("audios(id) ON DELETE CASCADE"),
            ColumnDefinition::new("preferred_transcription_id", "TEXT")
                .references("transcriptions(id) ON DELETE SET NULL"),
            ColumnDefinition::new("user_comments", "TEXT"),
            ColumnDefinition::new("user_identifier", "TEXT"),
            ColumnDefinition::new("session_id", "TEXT"),
            ColumnDefinition::new("ip_address", "TEXT"),
            ColumnDefinition::new("user_agent", "TEXT"),
            timestamp("created_at"),
        ]
    }
}

/// Create or synchronize every table, parents before children
pub async fn sync_all_table_schemas(pool: &SqlitePool) -> Result<()> {
    sync_table::<AudiosTableSchema>(pool).await?;
    sync_table::<ModelsTableSchema>(pool).await?;
    sync_table::<TranscriptionsTableSchema>(pool).await?;
    sync_table::<FeedbackTableSchema>(pool).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transcriptions_unique_per_audio_and_model() {
        let sql = TranscriptionsTableSchema::create_statement();
        assert!(sql.contains("UNIQUE (audio_id, model_id)"));
        assert!(sql.contains("model_id TEXT NOT NULL REFERENCES models(id) ON DELETE CASCADE"));
    }

    #[test]
    fn test_feedback_preference_is_nullable_reference() {
        let columns = FeedbackTableSchema::expected_columns();
        let preferred = columns
            .iter()
            .find(|c| c.name == "preferred_transcription_id")
            .unwrap();
        assert!(!preferred.not_null);
        assert_eq!(
            preferred.references.as_deref(),
            Some("transcriptions(id) ON DELETE SET NULL")
        );
    }

    #[test]
    fn test_audios_validated_flag_defaults_false() {
        let columns = AudiosTableSchema::expected_columns();
        let flag = columns.iter().find(|c| c.name == "is_validated").unwrap();
        assert!(flag.not_null);
        assert_eq!(flag.default_value.as_deref(), Some("0"));
    }
}
