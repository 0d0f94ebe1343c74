//! Database initialization
//!
//! Startup sequence:
//! 1. open (creating the file if needed) and set connection pragmas
//! 2. create missing tables / add missing columns from the declared schemas
//! 3. run versioned migrations

use crate::db::{migrations::run_migrations, table_schemas::sync_all_table_schemas};
use crate::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

/// Busy timeout applied to every pooled connection
const BUSY_TIMEOUT: Duration = Duration::from_millis(5000);

/// Open or create the database file and bring its schema up to date
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Pragmas set through the connect options apply to every connection in
    // the pool, not just the one that happens to run a PRAGMA statement.
    let options = SqliteConnectOptions::from_str(&format!("sqlite://{}", db_path.display()))?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(BUSY_TIMEOUT);

    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect_with(options)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    prepare_schema(&pool).await?;
    Ok(pool)
}

/// Single-connection in-memory database with the full schema
///
/// One connection only: every SQLite `:memory:` connection is its own
/// database.
pub async fn init_memory_database() -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?;
    prepare_schema(&pool).await?;
    Ok(pool)
}

async fn prepare_schema(pool: &SqlitePool) -> Result<()> {
    sync_all_table_schemas(pool).await?;
    run_migrations(pool).await?;
    Ok(())
}
