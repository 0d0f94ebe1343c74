//! Declarative schema synchronization
//!
//! Each table is described once by a [`TableSchema`]. On startup the table is
//! created from that description when missing, and columns added to the
//! description later are appended to existing databases with
//! `ALTER TABLE ... ADD COLUMN`.
//!
//! Type or constraint drift on existing columns is only reported; fixing it
//! needs a versioned migration (see `migrations.rs`).

use crate::Result;
use sqlx::{Row, SqlitePool};
use tracing::{debug, info, warn};

/// Column definition with SQL constraints
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDefinition {
    pub name: String,
    /// SQL type (e.g., "TEXT", "INTEGER", "REAL")
    pub sql_type: String,
    pub not_null: bool,
    pub primary_key: bool,
    pub unique: bool,
    /// DEFAULT expression, written verbatim
    pub default_value: Option<String>,
    /// REFERENCES clause target, e.g. `audios(id) ON DELETE CASCADE`
    pub references: Option<String>,
}

impl ColumnDefinition {
    pub fn new(name: impl Into<String>, sql_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sql_type: sql_type.into(),
            not_null: false,
            primary_key: false,
            unique: false,
            default_value: None,
            references: None,
        }
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    pub fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn default(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn references(mut self, target: impl Into<String>) -> Self {
        self.references = Some(target.into());
        self
    }

    /// Column clause as used inside CREATE TABLE
    pub fn create_clause(&self) -> String {
        let mut sql = format!("{} {}", self.name, self.sql_type);
        if self.primary_key {
            sql.push_str(" PRIMARY KEY");
        }
        if self.not_null {
            sql.push_str(" NOT NULL");
        }
        if self.unique {
            sql.push_str(" UNIQUE");
        }
        if let Some(default) = &self.default_value {
            sql.push_str(&format!(" DEFAULT {default}"));
        }
        if let Some(target) = &self.references {
            sql.push_str(&format!(" REFERENCES {target}"));
        }
        sql
    }

    /// Column clause usable by ALTER TABLE ADD COLUMN
    ///
    /// SQLite cannot add PRIMARY KEY or UNIQUE columns, and NOT NULL only with
    /// a default; those parts are dropped with a warning.
    fn add_clause(&self, table: &str) -> String {
        let mut sql = format!("{} {}", self.name, self.sql_type);

        if self.primary_key || self.unique {
            warn!(
                "Cannot add PRIMARY KEY/UNIQUE column {}.{} via ALTER TABLE; adding it unconstrained",
                table, self.name
            );
        }

        match (&self.default_value, self.not_null) {
            (Some(default), true) => sql.push_str(&format!(" NOT NULL DEFAULT {default}")),
            (Some(default), false) => sql.push_str(&format!(" DEFAULT {default}")),
            (None, true) => warn!(
                "Cannot add NOT NULL column {}.{} without DEFAULT; adding it nullable",
                table, self.name
            ),
            (None, false) => {}
        }

        if let Some(target) = &self.references {
            sql.push_str(&format!(" REFERENCES {target}"));
        }
        sql
    }
}

/// Actual column from `PRAGMA table_info`
#[derive(Debug, Clone)]
pub struct ActualColumn {
    pub cid: i32,
    pub name: String,
    pub type_name: String,
    pub not_null: bool,
    pub pk: bool,
}

/// Difference between the declared and the actual schema
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaDrift {
    MissingColumn { column: ColumnDefinition },
    TypeMismatch { column: String, expected: String, actual: String },
    ConstraintMismatch { column: String, constraint: &'static str },
}

/// Declared schema of one table
pub trait TableSchema {
    fn table_name() -> &'static str;

    /// Columns in creation order
    fn expected_columns() -> Vec<ColumnDefinition>;

    /// Table-level constraints such as composite UNIQUE keys
    fn table_constraints() -> Vec<String> {
        Vec::new()
    }

    /// Full CREATE TABLE IF NOT EXISTS statement
    fn create_statement() -> String {
        let mut clauses: Vec<String> = Self::expected_columns()
            .iter()
            .map(ColumnDefinition::create_clause)
            .collect();
        clauses.extend(Self::table_constraints());
        format!(
            "CREATE TABLE IF NOT EXISTS {} (\n    {}\n)",
            Self::table_name(),
            clauses.join(",\n    ")
        )
    }
}

/// Read the actual schema of a table
pub async fn introspect_table(pool: &SqlitePool, table_name: &str) -> Result<Vec<ActualColumn>> {
    let rows = sqlx::query(&format!("PRAGMA table_info({table_name})"))
        .fetch_all(pool)
        .await?;

    let mut columns: Vec<ActualColumn> = rows
        .iter()
        .map(|row| ActualColumn {
            cid: row.get("cid"),
            name: row.get("name"),
            type_name: row.get("type"),
            not_null: row.get::<i32, _>("notnull") != 0,
            pk: row.get::<i32, _>("pk") != 0,
        })
        .collect();
    columns.sort_by_key(|c| c.cid);

    Ok(columns)
}

pub async fn table_exists(pool: &SqlitePool, table_name: &str) -> Result<bool> {
    let exists: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?)",
    )
    .bind(table_name)
    .fetch_one(pool)
    .await?;
    Ok(exists)
}

/// Compare declared columns against the actual ones
pub fn diff_columns(expected: &[ColumnDefinition], actual: &[ActualColumn]) -> Vec<SchemaDrift> {
    let mut drift = Vec::new();

    for want in expected {
        let Some(have) = actual.iter().find(|c| c.name.eq_ignore_ascii_case(&want.name)) else {
            drift.push(SchemaDrift::MissingColumn { column: want.clone() });
            continue;
        };

        if type_affinity(&want.sql_type) != type_affinity(&have.type_name) {
            drift.push(SchemaDrift::TypeMismatch {
                column: want.name.clone(),
                expected: want.sql_type.clone(),
                actual: have.type_name.clone(),
            });
        }
        // SQLite does not report NOT NULL for PRIMARY KEY columns
        if want.not_null && !have.not_null && !have.pk {
            drift.push(SchemaDrift::ConstraintMismatch {
                column: want.name.clone(),
                constraint: "NOT NULL",
            });
        }
        if want.primary_key && !have.pk {
            drift.push(SchemaDrift::ConstraintMismatch {
                column: want.name.clone(),
                constraint: "PRIMARY KEY",
            });
        }
    }

    drift
}

/// SQLite type affinity of a declared type name
fn type_affinity(sql_type: &str) -> &'static str {
    let t = sql_type.to_ascii_uppercase();
    if t.contains("INT") {
        "INTEGER"
    } else if t.contains("CHAR") || t.contains("CLOB") || t.contains("TEXT") {
        "TEXT"
    } else if t.contains("REAL") || t.contains("FLOA") || t.contains("DOUB") {
        "REAL"
    } else if t.is_empty() || t.contains("BLOB") {
        "BLOB"
    } else {
        "NUMERIC"
    }
}

/// Create the table if missing, then add any declared column it lacks
pub async fn sync_table<T: TableSchema>(pool: &SqlitePool) -> Result<()> {
    let table = T::table_name();

    if !table_exists(pool, table).await? {
        sqlx::query(&T::create_statement()).execute(pool).await?;
        info!("Created table '{}'", table);
        return Ok(());
    }

    let actual = introspect_table(pool, table).await?;
    let drift = diff_columns(&T::expected_columns(), &actual);
    if drift.is_empty() {
        debug!("Schema up to date for '{}'", table);
        return Ok(());
    }

    for change in drift {
        match change {
            SchemaDrift::MissingColumn { column } => {
                let sql = format!("ALTER TABLE {} ADD COLUMN {}", table, column.add_clause(table));
                match sqlx::query(&sql).execute(pool).await {
                    Ok(_) => info!("Added column {}.{} ({})", table, column.name, column.sql_type),
                    Err(sqlx::Error::Database(e)) if e.message().contains("duplicate column") => {
                        debug!("Column {}.{} already added", table, column.name);
                    }
                    Err(e) => return Err(e.into()),
                }
            }
            SchemaDrift::TypeMismatch { column, expected, actual } => warn!(
                "Type mismatch in {}.{}: expected '{}', found '{}'; needs a migration",
                table, column, expected, actual
            ),
            SchemaDrift::ConstraintMismatch { column, constraint } => warn!(
                "Constraint mismatch in {}.{}: missing {}; needs a migration",
                table, column, constraint
            ),
        }
    }

    Ok(())
}
