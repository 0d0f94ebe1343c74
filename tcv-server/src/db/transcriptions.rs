//! Transcription queries

use sqlx::SqlitePool;
use tcv_common::{time, uuid_utils, Model, Transcription};

/// Column values written by the CSV import
#[derive(Debug, Clone)]
pub struct TranscriptionUpsert<'a> {
    pub audio_id: &'a str,
    pub model_id: &'a str,
    pub text: &'a str,
    pub bleu_score: Option<f64>,
    pub chrf_score: Option<f64>,
    pub word_count: i64,
}

/// Insert or overwrite the transcription for (audio, model)
///
/// An existing row keeps its id and `created_at`.
pub async fn upsert(pool: &SqlitePool, row: &TranscriptionUpsert<'_>) -> sqlx::Result<Transcription> {
    let now = time::now_rfc3339();
    sqlx::query_as::<_, Transcription>(
        r#"
        INSERT INTO transcriptions (
            id, audio_id, model_id, text, bleu_score, chrf_score, word_count,
            created_at, updated_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT (audio_id, model_id) DO UPDATE SET
            text = excluded.text,
            bleu_score = excluded.bleu_score,
            chrf_score = excluded.chrf_score,
            word_count = excluded.word_count,
            updated_at = excluded.updated_at
        RETURNING *
        "#,
    )
    .bind(uuid_utils::generate())
    .bind(row.audio_id)
    .bind(row.model_id)
    .bind(row.text)
    .bind(row.bleu_score)
    .bind(row.chrf_score)
    .bind(row.word_count)
    .bind(&now)
    .bind(&now)
    .fetch_one(pool)
    .await
}

#[derive(sqlx::FromRow)]
struct JoinedRow {
    #[sqlx(flatten)]
    transcription: Transcription,
    m_id: String,
    m_model_name: String,
    m_description: Option<String>,
    m_created_at: String,
    m_updated_at: String,
}

/// Transcriptions of one audio with their model, ordered by model name
pub async fn list_for_audio(pool: &SqlitePool, audio_id: &str) -> sqlx::Result<Vec<(Transcription, Model)>> {
    let rows = sqlx::query_as::<_, JoinedRow>(
        r#"
        SELECT t.*,
               m.id AS m_id,
               m.model_name AS m_model_name,
               m.description AS m_description,
               m.created_at AS m_created_at,
               m.updated_at AS m_updated_at
        FROM transcriptions t
        JOIN models m ON m.id = t.model_id
        WHERE t.audio_id = ?
        ORDER BY m.model_name, t.created_at
        "#,
    )
    .bind(audio_id)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| {
            let model = Model {
                id: row.m_id,
                model_name: row.m_model_name,
                description: row.m_description,
                created_at: row.m_created_at,
                updated_at: row.m_updated_at,
            };
            (row.transcription, model)
        })
        .collect())
}

/// Full table for the debug dump
pub async fn dump(pool: &SqlitePool) -> sqlx::Result<Vec<Transcription>> {
    sqlx::query_as::<_, Transcription>("SELECT * FROM transcriptions ORDER BY created_at DESC, rowid DESC")
        .fetch_all(pool)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{audios, models};
    use tcv_common::db::init_memory_database;

    async fn seeded() -> (SqlitePool, String, String) {
        let pool = init_memory_database().await.unwrap();
        let audio = audios::insert(
            &pool,
            &audios::NewAudio {
                audio_name: "a.wav",
                storage_url: "http://localhost/a",
                storage_path: "uploads/1_a.wav",
                language_tag: None,
                file_size_bytes: None,
                mime_type: None,
            },
        )
        .await
        .unwrap();
        let model = models::create(&pool, "Whisper", None).await.unwrap();
        (pool, audio.id, model.id)
    }

    #[tokio::test]
    async fn test_upsert_overwrites_in_place() {
        let (pool, audio_id, model_id) = seeded().await;

        let first = upsert(
            &pool,
            &TranscriptionUpsert {
                audio_id: &audio_id,
                model_id: &model_id,
                text: "old text",
                bleu_score: Some(10.0),
                chrf_score: None,
                word_count: 2,
            },
        )
        .await
        .unwrap();

        let second = upsert(
            &pool,
            &TranscriptionUpsert {
                audio_id: &audio_id,
                model_id: &model_id,
                text: "new longer text",
                bleu_score: None,
                chrf_score: Some(55.5),
                word_count: 3,
            },
        )
        .await
        .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(first.created_at, second.created_at);
        assert_eq!(second.text, "new longer text");
        assert!(second.bleu_score.is_none());
        assert_eq!(second.chrf_score, Some(55.5));

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM transcriptions")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_list_for_audio_joins_model() {
        let (pool, audio_id, model_id) = seeded().await;
        let other = models::create(&pool, "Azure", Some("cloud")).await.unwrap();

        for id in [&model_id, &other.id] {
            upsert(
                &pool,
                &TranscriptionUpsert {
                    audio_id: &audio_id,
                    model_id: id,
                    text: "salam",
                    bleu_score: None,
                    chrf_score: None,
                    word_count: 1,
                },
            )
            .await
            .unwrap();
        }

        let listed = list_for_audio(&pool, &audio_id).await.unwrap();
        let names: Vec<&str> = listed.iter().map(|(_, m)| m.model_name.as_str()).collect();
        assert_eq!(names, vec!["Azure", "Whisper"]);
        assert_eq!(listed[0].1.description.as_deref(), Some("cloud"));
        assert_eq!(listed[0].0.model_id, other.id);
    }
}
