//! Audio queries

use sqlx::SqlitePool;
use tcv_common::api_types::Navigation;
use tcv_common::{time, uuid_utils, Audio};

/// Newest-first ordering shared by the gallery and navigation
const NEWEST_FIRST: &str = "created_at DESC, rowid DESC";

/// Column values for a freshly uploaded file
#[derive(Debug, Clone)]
pub struct NewAudio<'a> {
    pub audio_name: &'a str,
    pub storage_url: &'a str,
    pub storage_path: &'a str,
    pub language_tag: Option<&'a str>,
    pub file_size_bytes: Option<i64>,
    pub mime_type: Option<&'a str>,
}

pub async fn insert(pool: &SqlitePool, new: &NewAudio<'_>) -> sqlx::Result<Audio> {
    let now = time::now_rfc3339();
    sqlx::query_as::<_, Audio>(
        r#"
        INSERT INTO audios (
            id, audio_name, storage_url, storage_path, language_tag,
            duration_seconds, file_size_bytes, mime_type, is_validated,
            created_at, updated_at
        )
        VALUES (?, ?, ?, ?, ?, NULL, ?, ?, 0, ?, ?)
        RETURNING *
        "#,
    )
    .bind(uuid_utils::generate())
    .bind(new.audio_name)
    .bind(new.storage_url)
    .bind(new.storage_path)
    .bind(new.language_tag)
    .bind(new.file_size_bytes)
    .bind(new.mime_type)
    .bind(&now)
    .bind(&now)
    .fetch_one(pool)
    .await
}

/// All audios, newest first
pub async fn list(pool: &SqlitePool) -> sqlx::Result<Vec<Audio>> {
    sqlx::query_as::<_, Audio>(&format!("SELECT * FROM audios ORDER BY {NEWEST_FIRST}"))
        .fetch_all(pool)
        .await
}

pub async fn get(pool: &SqlitePool, id: &str) -> sqlx::Result<Option<Audio>> {
    sqlx::query_as::<_, Audio>("SELECT * FROM audios WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// The audio with exactly this name
///
/// Returns `None` when no audio or more than one audio carries the name.
pub async fn find_unique_by_name(pool: &SqlitePool, audio_name: &str) -> sqlx::Result<Option<Audio>> {
    let mut matches = sqlx::query_as::<_, Audio>("SELECT * FROM audios WHERE audio_name = ? LIMIT 2")
        .bind(audio_name)
        .fetch_all(pool)
        .await?;

    if matches.len() == 1 {
        Ok(matches.pop())
    } else {
        Ok(None)
    }
}

/// Set the validated flag; `None` when the audio does not exist
pub async fn set_validated(pool: &SqlitePool, id: &str, validated: bool) -> sqlx::Result<Option<Audio>> {
    sqlx::query_as::<_, Audio>(
        "UPDATE audios SET is_validated = ?, updated_at = ? WHERE id = ? RETURNING *",
    )
    .bind(validated)
    .bind(time::now_rfc3339())
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Neighbours of an audio in the newest-first list
pub async fn neighbours(pool: &SqlitePool, id: &str) -> sqlx::Result<Navigation> {
    let row: Option<(Option<String>, Option<String>)> = sqlx::query_as(&format!(
        r#"
        SELECT previous_id, next_id FROM (
            SELECT id,
                   LAG(id) OVER (ORDER BY {NEWEST_FIRST}) AS previous_id,
                   LEAD(id) OVER (ORDER BY {NEWEST_FIRST}) AS next_id
            FROM audios
        )
        WHERE id = ?
        "#
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    let (previous_id, next_id) = row.unwrap_or((None, None));
    Ok(Navigation { previous_id, next_id })
}

/// Full table for the debug dump
pub async fn dump(pool: &SqlitePool) -> sqlx::Result<Vec<Audio>> {
    list(pool).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use tcv_common::db::init_memory_database;

    fn new_audio(name: &str) -> NewAudio<'_> {
        NewAudio {
            audio_name: name,
            storage_url: "http://localhost/storage/audio-files/x",
            storage_path: "uploads/1_x",
            language_tag: Some("pashto"),
            file_size_bytes: Some(42),
            mime_type: Some("audio/wav"),
        }
    }

    #[tokio::test]
    async fn test_insert_defaults() {
        let pool = init_memory_database().await.unwrap();
        let audio = insert(&pool, &new_audio("a.wav")).await.unwrap();

        assert_eq!(audio.audio_name, "a.wav");
        assert!(!audio.is_validated);
        assert!(audio.duration_seconds.is_none());
        assert_eq!(audio.created_at, audio.updated_at);
        assert!(uuid_utils::parse(&audio.id).is_ok());
    }

    #[tokio::test]
    async fn test_list_newest_first_and_neighbours() {
        let pool = init_memory_database().await.unwrap();
        let first = insert(&pool, &new_audio("1.wav")).await.unwrap();
        let second = insert(&pool, &new_audio("2.wav")).await.unwrap();
        let third = insert(&pool, &new_audio("3.wav")).await.unwrap();

        let ids: Vec<String> = list(&pool).await.unwrap().into_iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![third.id.clone(), second.id.clone(), first.id.clone()]);

        let nav = neighbours(&pool, &second.id).await.unwrap();
        assert_eq!(nav.previous_id.as_deref(), Some(third.id.as_str()));
        assert_eq!(nav.next_id.as_deref(), Some(first.id.as_str()));

        let nav = neighbours(&pool, &third.id).await.unwrap();
        assert!(nav.previous_id.is_none());

        let nav = neighbours(&pool, "missing").await.unwrap();
        assert_eq!(nav, Navigation::default());
    }

    #[tokio::test]
    async fn test_find_unique_by_name() {
        let pool = init_memory_database().await.unwrap();
        let single = insert(&pool, &new_audio("single.wav")).await.unwrap();
        insert(&pool, &new_audio("twice.wav")).await.unwrap();
        insert(&pool, &new_audio("twice.wav")).await.unwrap();

        let found = find_unique_by_name(&pool, "single.wav").await.unwrap();
        assert_eq!(found.map(|a| a.id), Some(single.id));
        assert!(find_unique_by_name(&pool, "twice.wav").await.unwrap().is_none());
        assert!(find_unique_by_name(&pool, "SINGLE.wav").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_set_validated() {
        let pool = init_memory_database().await.unwrap();
        let audio = insert(&pool, &new_audio("a.wav")).await.unwrap();

        let updated = set_validated(&pool, &audio.id, true).await.unwrap().unwrap();
        assert!(updated.is_validated);
        assert!(updated.updated_at >= audio.updated_at);

        assert!(set_validated(&pool, "missing", true).await.unwrap().is_none());
    }
}
