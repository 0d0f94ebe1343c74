//! Integration tests for database initialization
//!
//! Covers first-run creation, reopening an existing file, the declared
//! constraints (unique transcription per audio/model, cascades) and the
//! foreign key pragma being active on pooled connections.

use sqlx::SqlitePool;
use tcv_common::db::{get_schema_version, init_database, CURRENT_SCHEMA_VERSION};
use tempfile::TempDir;

async fn fresh_db() -> (TempDir, SqlitePool) {
    let dir = TempDir::new().unwrap();
    let pool = init_database(&dir.path().join("tcv.db")).await.unwrap();
    (dir, pool)
}

async fn insert_audio(pool: &SqlitePool, id: &str) {
    sqlx::query(
        "INSERT INTO audios (id, audio_name, storage_url, storage_path, created_at, updated_at)
         VALUES (?, ?, 'http://x', 'uploads/x', '2025-01-01T00:00:00.000Z', '2025-01-01T00:00:00.000Z')",
    )
    .bind(id)
    .bind(format!("{id}.wav"))
    .execute(pool)
    .await
    .unwrap();
}

async fn insert_model(pool: &SqlitePool, id: &str) {
    sqlx::query(
        "INSERT INTO models (id, model_name, created_at, updated_at)
         VALUES (?, ?, '2025-01-01T00:00:00.000Z', '2025-01-01T00:00:00.000Z')",
    )
    .bind(id)
    .bind(format!("model-{id}"))
    .execute(pool)
    .await
    .unwrap();
}

async fn insert_transcription(pool: &SqlitePool, id: &str, audio_id: &str, model_id: &str) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO transcriptions (id, audio_id, model_id, text, created_at, updated_at)
         VALUES (?, ?, ?, 'text', '2025-01-01T00:00:00.000Z', '2025-01-01T00:00:00.000Z')",
    )
    .bind(id)
    .bind(audio_id)
    .bind(model_id)
    .execute(pool)
    .await
    .map(|_| ())
}

#[tokio::test]
async fn test_database_created_when_missing() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("nested").join("tcv.db");
    assert!(!db_path.exists());

    let pool = init_database(&db_path).await.unwrap();
    assert!(db_path.exists());
    assert_eq!(get_schema_version(&pool).await.unwrap(), CURRENT_SCHEMA_VERSION);
}

#[tokio::test]
async fn test_existing_database_reopens_with_data() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("tcv.db");

    let pool = init_database(&db_path).await.unwrap();
    insert_audio(&pool, "a1").await;
    pool.close().await;

    let pool = init_database(&db_path).await.unwrap();
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM audios")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn test_transcription_unique_per_audio_and_model() {
    let (_dir, pool) = fresh_db().await;
    insert_audio(&pool, "a1").await;
    insert_model(&pool, "m1").await;

    insert_transcription(&pool, "t1", "a1", "m1").await.unwrap();
    let duplicate = insert_transcription(&pool, "t2", "a1", "m1").await;
    assert!(duplicate.is_err(), "second row for the same audio/model must be rejected");
}

#[tokio::test]
async fn test_foreign_keys_enforced_on_every_connection() {
    let (_dir, pool) = fresh_db().await;

    // Several attempts so more than one pooled connection is exercised
    for i in 0..5 {
        let result = insert_transcription(&pool, &format!("t{i}"), "missing-audio", "missing-model").await;
        assert!(result.is_err());
    }
}

#[tokio::test]
async fn test_model_delete_cascades_and_nulls_preferences() {
    let (_dir, pool) = fresh_db().await;
    insert_audio(&pool, "a1").await;
    insert_model(&pool, "m1").await;
    insert_transcription(&pool, "t1", "a1", "m1").await.unwrap();
    sqlx::query(
        "INSERT INTO feedback (id, audio_id, preferred_transcription_id, created_at)
         VALUES ('f1', 'a1', 't1', '2025-01-01T00:00:00.000Z')",
    )
    .execute(&pool)
    .await
    .unwrap();

    sqlx::query("DELETE FROM models WHERE id = 'm1'")
        .execute(&pool)
        .await
        .unwrap();

    let transcriptions: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM transcriptions")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(transcriptions, 0);

    let preferred: Option<String> =
        sqlx::query_scalar("SELECT preferred_transcription_id FROM feedback WHERE id = 'f1'")
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(preferred, None);
}
