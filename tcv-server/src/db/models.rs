//! Model queries

use sqlx::SqlitePool;
use tcv_common::models::ModelSummary;
use tcv_common::{time, uuid_utils, Model};
use tracing::info;

/// Listing projection ordered by name
pub async fn list_summaries(pool: &SqlitePool) -> sqlx::Result<Vec<ModelSummary>> {
    sqlx::query_as::<_, ModelSummary>(
        "SELECT id, model_name, description FROM models ORDER BY model_name, rowid",
    )
    .fetch_all(pool)
    .await
}

pub async fn get(pool: &SqlitePool, id: &str) -> sqlx::Result<Option<Model>> {
    sqlx::query_as::<_, Model>("SELECT * FROM models WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn exists(pool: &SqlitePool, id: &str) -> sqlx::Result<bool> {
    let found: Option<i64> = sqlx::query_scalar("SELECT 1 FROM models WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(found.is_some())
}

pub async fn create(pool: &SqlitePool, model_name: &str, description: Option<&str>) -> sqlx::Result<Model> {
    let now = time::now_rfc3339();
    sqlx::query_as::<_, Model>(
        r#"
        INSERT INTO models (id, model_name, description, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(uuid_utils::generate())
    .bind(model_name)
    .bind(description)
    .bind(&now)
    .bind(&now)
    .fetch_one(pool)
    .await
}

/// Apply a partial update; `None` when the model does not exist
///
/// `model_name: None` keeps the name. `description: None` keeps the
/// description, `Some(None)` clears it.
pub async fn update(
    pool: &SqlitePool,
    id: &str,
    model_name: Option<&str>,
    description: Option<Option<&str>>,
) -> sqlx::Result<Option<Model>> {
    let Some(current) = get(pool, id).await? else {
        return Ok(None);
    };

    let name = model_name.unwrap_or(&current.model_name);
    let description = match description {
        Some(value) => value,
        None => current.description.as_deref(),
    };

    sqlx::query_as::<_, Model>(
        "UPDATE models SET model_name = ?, description = ?, updated_at = ? WHERE id = ? RETURNING *",
    )
    .bind(name)
    .bind(description)
    .bind(time::now_rfc3339())
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Delete a model; its transcriptions go with it through the foreign key
pub async fn delete(pool: &SqlitePool, id: &str) -> sqlx::Result<bool> {
    let result = sqlx::query("DELETE FROM models WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Insert each named model unless one with that name already exists
pub async fn seed(pool: &SqlitePool, names: &[String]) -> sqlx::Result<usize> {
    let mut inserted = 0;
    for name in names.iter().map(|n| n.trim()).filter(|n| !n.is_empty()) {
        let present: Option<i64> = sqlx::query_scalar("SELECT 1 FROM models WHERE model_name = ?")
            .bind(name)
            .fetch_optional(pool)
            .await?;
        if present.is_none() {
            create(pool, name, None).await?;
            info!("Seeded model: {}", name);
            inserted += 1;
        }
    }
    Ok(inserted)
}

/// Full table for the debug dump
pub async fn dump(pool: &SqlitePool) -> sqlx::Result<Vec<Model>> {
    sqlx::query_as::<_, Model>("SELECT * FROM models ORDER BY model_name, rowid")
        .fetch_all(pool)
        .await
}
