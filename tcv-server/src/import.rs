//! CSV transcription import
//!
//! Rows commit one at a time. A failing row is reported and the import moves
//! on; nothing is rolled back.

use sqlx::SqlitePool;
use tcv_common::api_types::{ImportReport, ImportRowError};
use tcv_common::csv_row::CsvRow;
use tcv_common::models::word_count;
use tracing::{debug, info, warn};

use crate::db::{audios, transcriptions};

/// Import parsed CSV rows as transcriptions of one model
///
/// The model is expected to exist; callers check it first.
pub async fn import_rows(pool: &SqlitePool, model_id: &str, rows: &[CsvRow]) -> ImportReport {
    let mut report = ImportReport::default();

    for row in rows {
        let (Some(audio_name), Some(text)) = (row.audio_name(), row.transcription()) else {
            debug!("Skipping CSV row without audio name or transcription: {:?}", row.cells());
            report.skipped += 1;
            continue;
        };
        let audio_name = audio_name.trim();
        let text = text.trim();

        let audio = match audios::find_unique_by_name(pool, audio_name).await {
            Ok(Some(audio)) => audio,
            Ok(None) => {
                report.audio_not_found.push(audio_name.to_string());
                continue;
            }
            Err(e) => {
                warn!("Audio lookup failed for {}: {}", audio_name, e);
                report.errors.push(ImportRowError {
                    audio_name: audio_name.to_string(),
                    error: e.to_string(),
                });
                continue;
            }
        };
        report.processed += 1;

        let upsert = transcriptions::TranscriptionUpsert {
            audio_id: &audio.id,
            model_id,
            text,
            bleu_score: row.bleu_score(),
            chrf_score: row.chrf_score(),
            word_count: word_count(text),
        };

        match transcriptions::upsert(pool, &upsert).await {
            Ok(_) => report.transcriptions_added += 1,
            Err(e) => {
                warn!("Transcription upsert failed for {}: {}", audio_name, e);
                report.errors.push(ImportRowError {
                    audio_name: audio_name.to_string(),
                    error: e.to_string(),
                });
            }
        }
    }

    info!(
        "CSV import for model {}: {} processed, {} written, {} skipped, {} not found, {} errors",
        model_id,
        report.processed,
        report.transcriptions_added,
        report.skipped,
        report.audio_not_found.len(),
        report.errors.len()
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models;
    use tcv_common::db::init_memory_database;

    async fn setup() -> (SqlitePool, String) {
        let pool = init_memory_database().await.unwrap();
        for name in ["a.wav", "b.wav"] {
            audios::insert(
                &pool,
                &audios::NewAudio {
                    audio_name: name,
                    storage_url: "http://localhost/x",
                    storage_path: "uploads/1_x",
                    language_tag: None,
                    file_size_bytes: None,
                    mime_type: None,
                },
            )
            .await
            .unwrap();
        }
        let model = models::create(&pool, "Whisper", None).await.unwrap();
        (pool, model.id)
    }

    fn row(cells: &[(&str, &str)]) -> CsvRow {
        cells.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[tokio::test]
    async fn test_mixed_batch_report() {
        let (pool, model_id) = setup().await;
        let rows = vec![
            row(&[("audio_name", "a.wav"), ("transcription", "  one two  "), ("BLEU", "12.5")]),
            row(&[("filename", "b.wav"), ("Transcription", "three"), ("chrF++", "n/a")]),
            row(&[("audio_name", "missing.wav"), ("transcription", "x")]),
            row(&[("audio_name", "a.wav")]),
            row(&[("transcription", "orphan")]),
        ];

        let report = import_rows(&pool, &model_id, &rows).await;
        assert_eq!(report.processed, 2);
        assert_eq!(report.transcriptions_added, 2);
        assert_eq!(report.skipped, 2);
        assert_eq!(report.audio_not_found, vec!["missing.wav".to_string()]);
        assert!(report.errors.is_empty());

        let stored: (String, Option<f64>, Option<i64>) = sqlx::query_as(
            "SELECT t.text, t.bleu_score, t.word_count FROM transcriptions t
             JOIN audios a ON a.id = t.audio_id WHERE a.audio_name = 'a.wav'",
        )
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(stored, ("one two".to_string(), Some(12.5), Some(2)));
    }

    #[tokio::test]
    async fn test_zero_score_is_kept() {
        let (pool, model_id) = setup().await;
        let rows = vec![row(&[("audio", "a.wav"), ("transcription", "x"), ("bleu_score", "0")])];
        import_rows(&pool, &model_id, &rows).await;

        let bleu: Option<f64> = sqlx::query_scalar("SELECT bleu_score FROM transcriptions")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(bleu, Some(0.0));
    }

    #[tokio::test]
    async fn test_upsert_failure_is_reported_per_row() {
        let (pool, _) = setup().await;
        let rows = vec![row(&[("audio_name", "a.wav"), ("transcription", "x")])];

        // Unknown model id violates the foreign key
        let report = import_rows(&pool, "no-such-model", &rows).await;
        assert_eq!(report.processed, 1);
        assert_eq!(report.transcriptions_added, 0);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].audio_name, "a.wav");
    }
}
