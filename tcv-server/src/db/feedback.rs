//! Feedback queries
//!
//! Feedback is append-only. Neither the session nor the preferred
//! transcription is checked against the audio here.

use sqlx::SqlitePool;
use tcv_common::{time, uuid_utils, Feedback};

#[derive(Debug, Clone, Default)]
pub struct NewFeedback<'a> {
    pub audio_id: &'a str,
    pub preferred_transcription_id: Option<&'a str>,
    pub user_comments: Option<&'a str>,
    pub session_id: Option<&'a str>,
    pub ip_address: Option<&'a str>,
    pub user_agent: Option<&'a str>,
}

pub async fn insert(pool: &SqlitePool, new: &NewFeedback<'_>) -> sqlx::Result<Feedback> {
    sqlx::query_as::<_, Feedback>(
        r#"
        INSERT INTO feedback (
            id, audio_id, preferred_transcription_id, user_comments,
            user_identifier, session_id, ip_address, user_agent, created_at
        )
        VALUES (?, ?, ?, ?, NULL, ?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(uuid_utils::generate())
    .bind(new.audio_id)
    .bind(new.preferred_transcription_id)
    .bind(new.user_comments)
    .bind(new.session_id)
    .bind(new.ip_address)
    .bind(new.user_agent)
    .bind(time::now_rfc3339())
    .fetch_one(pool)
    .await
}

/// Feedback newest first, optionally for one audio
pub async fn list(pool: &SqlitePool, audio_id: Option<&str>) -> sqlx::Result<Vec<Feedback>> {
    match audio_id {
        Some(audio_id) => {
            sqlx::query_as::<_, Feedback>(
                "SELECT * FROM feedback WHERE audio_id = ? ORDER BY created_at DESC, rowid DESC",
            )
            .bind(audio_id)
            .fetch_all(pool)
            .await
        }
        None => {
            sqlx::query_as::<_, Feedback>("SELECT * FROM feedback ORDER BY created_at DESC, rowid DESC")
                .fetch_all(pool)
                .await
        }
    }
}

/// `preferred_transcription_id` of every feedback row for an audio
pub async fn preferences_for_audio(pool: &SqlitePool, audio_id: &str) -> sqlx::Result<Vec<Option<String>>> {
    sqlx::query_scalar("SELECT preferred_transcription_id FROM feedback WHERE audio_id = ?")
        .bind(audio_id)
        .fetch_all(pool)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::audios;
    use tcv_common::db::init_memory_database;

    async fn pool_with_audio() -> (SqlitePool, String) {
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
        (pool, audio.id)
    }

    #[tokio::test]
    async fn test_insert_and_list_newest_first() {
        let (pool, audio_id) = pool_with_audio().await;

        let first = insert(
            &pool,
            &NewFeedback {
                audio_id: &audio_id,
                user_comments: Some("first"),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        let second = insert(
            &pool,
            &NewFeedback {
                audio_id: &audio_id,
                user_comments: Some("second"),
                session_id: Some("session_1_abc"),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert!(first.user_identifier.is_none());
        let listed = list(&pool, Some(&audio_id)).await.unwrap();
        assert_eq!(listed.iter().map(|f| f.id.clone()).collect::<Vec<_>>(), vec![second.id, first.id]);
        assert_eq!(list(&pool, Some("other")).await.unwrap().len(), 0);
        assert_eq!(list(&pool, None).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_audio_is_rejected_by_foreign_key() {
        let (pool, _) = pool_with_audio().await;
        let result = insert(
            &pool,
            &NewFeedback {
                audio_id: "missing",
                ..Default::default()
            },
        )
        .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_preferences_include_comment_only_rows() {
        let (pool, audio_id) = pool_with_audio().await;
        insert(&pool, &NewFeedback { audio_id: &audio_id, user_comments: Some("meh"), ..Default::default() })
            .await
            .unwrap();

        let prefs = preferences_for_audio(&pool, &audio_id).await.unwrap();
        assert_eq!(prefs, vec![None]);
    }
}
