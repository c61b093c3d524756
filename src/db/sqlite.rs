//! SQLite database client.
//!
//! Implements `DatabaseClient` for the embedded practice database using sqlx.
//! Connections are opened read-only; the checking path never mutates tables.

use crate::db::{ColumnInfo, DatabaseClient, QueryResult, Row, TableColumn, Value};
use crate::error::{CheckError, Result};
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{Column as SqlxColumn, Row as SqlxRow, TypeInfo};
use std::path::Path;
use tracing::debug;

/// SQLite client over the practice database file.
#[derive(Debug)]
pub struct SqliteClient {
    pool: SqlitePool,
}

impl SqliteClient {
    /// Opens the practice database file read-only.
    ///
    /// Fails with a `Database` error if the file does not exist, with a hint
    /// to run the initialization step first.
    pub async fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CheckError::database(format!(
                "Database not found at {}. Run the database initialization script first.",
                path.display()
            )));
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .read_only(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(|e| CheckError::database(format!("Failed to open database: {e}")))?;

        debug!("Opened practice database read-only: {}", path.display());
        Ok(Self { pool })
    }

    /// Creates a client from an existing pool.
    ///
    /// Primarily useful for tests running against an in-memory database.
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DatabaseClient for SqliteClient {
    async fn execute_query(&self, sql: &str) -> Result<QueryResult> {
        let result = sqlx::query(sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| CheckError::query(format_query_error(e)))?;

        let columns: Vec<ColumnInfo> = match result.first() {
            Some(first_row) => first_row
                .columns()
                .iter()
                .map(|col| ColumnInfo::new(col.name(), col.type_info().name()))
                .collect(),
            // Empty result: prepare the statement to recover column metadata.
            None => self.fetch_column_metadata(sql).await?,
        };

        let rows: Vec<Row> = result.iter().map(convert_row).collect();

        Ok(QueryResult::with_data(columns, rows))
    }

    async fn list_tables(&self) -> Result<Vec<String>> {
        let names: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT name FROM sqlite_master
            WHERE type = 'table' AND name NOT LIKE 'sqlite_%'
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| CheckError::query(format!("Failed to list tables: {e}")))?;

        Ok(names)
    }

    async fn describe_table(&self, table: &str) -> Result<Vec<TableColumn>> {
        // PRAGMA arguments cannot be bound, so reject anything that is not a
        // plain identifier before splicing it in.
        if !is_plain_identifier(table) {
            return Err(CheckError::query(format!("Invalid table name: {table}")));
        }

        let rows: Vec<(i64, String, String, i64, Option<String>, i64)> =
            sqlx::query_as(&format!("PRAGMA table_info({table})"))
                .fetch_all(&self.pool)
                .await
                .map_err(|e| {
                    CheckError::query(format!("Failed to describe table {table}: {e}"))
                })?;

        if rows.is_empty() {
            return Err(CheckError::query(format!("No such table: {table}")));
        }

        Ok(rows
            .into_iter()
            .map(|(_cid, name, data_type, notnull, _default, pk)| TableColumn {
                name,
                data_type,
                is_nullable: notnull == 0,
                is_primary_key: pk > 0,
            })
            .collect())
    }

    async fn preview_table(&self, table: &str, limit: u32) -> Result<QueryResult> {
        if !is_plain_identifier(table) {
            return Err(CheckError::query(format!("Invalid table name: {table}")));
        }

        self.execute_query(&format!("SELECT * FROM {table} LIMIT {limit}"))
            .await
    }

    async fn close(&self) -> Result<()> {
        self.pool.close().await;
        Ok(())
    }
}

impl SqliteClient {
    /// Recovers column metadata for a query whose result set is empty, by
    /// preparing the statement and reading its column descriptions.
    async fn fetch_column_metadata(&self, sql: &str) -> Result<Vec<ColumnInfo>> {
        use sqlx::Executor;

        let described = self
            .pool
            .describe(sql)
            .await
            .map_err(|e| CheckError::query(format_query_error(e)))?;

        Ok(described
            .columns
            .iter()
            .map(|col| ColumnInfo::new(col.name(), col.type_info().name()))
            .collect())
    }
}

/// Returns true if `name` is a bare SQL identifier.
fn is_plain_identifier(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !name.chars().next().is_some_and(|c| c.is_ascii_digit())
}

/// Converts a sqlx SqliteRow to our Row type.
fn convert_row(row: &SqliteRow) -> Row {
    row.columns()
        .iter()
        .enumerate()
        .map(|(i, col)| convert_value(row, i, col.type_info().name()))
        .collect()
}

/// Converts a single column value from a SqliteRow to our Value type.
fn convert_value(row: &SqliteRow, index: usize, type_name: &str) -> Value {
    match type_name.to_uppercase().as_str() {
        "BOOLEAN" | "BOOL" => row
            .try_get::<Option<bool>, _>(index)
            .ok()
            .flatten()
            .map(Value::Bool)
            .unwrap_or(Value::Null),

        "INTEGER" | "INT" | "INT4" | "INT8" | "BIGINT" => row
            .try_get::<Option<i64>, _>(index)
            .ok()
            .flatten()
            .map(Value::Int)
            .unwrap_or(Value::Null),

        "REAL" | "FLOAT" | "DOUBLE" => row
            .try_get::<Option<f64>, _>(index)
            .ok()
            .flatten()
            .map(Value::Float)
            .unwrap_or(Value::Null),

        // NUMERIC affinity can hold either integer or real storage.
        "NUMERIC" => row
            .try_get::<Option<f64>, _>(index)
            .ok()
            .flatten()
            .map(Value::Float)
            .or_else(|| {
                row.try_get::<Option<i64>, _>(index)
                    .ok()
                    .flatten()
                    .map(Value::Int)
            })
            .unwrap_or(Value::Null),

        // SQLite stores dates and timestamps as text; decode through chrono
        // so the canonical form is a fixed ISO rendering.
        "DATE" => row
            .try_get::<Option<chrono::NaiveDate>, _>(index)
            .ok()
            .flatten()
            .map(|d| Value::Text(d.format("%Y-%m-%d").to_string()))
            .unwrap_or(Value::Null),

        "DATETIME" | "TIMESTAMP" => row
            .try_get::<Option<chrono::NaiveDateTime>, _>(index)
            .ok()
            .flatten()
            .map(|dt| Value::Text(dt.format("%Y-%m-%dT%H:%M:%S").to_string()))
            .unwrap_or(Value::Null),

        "BLOB" => row
            .try_get::<Option<Vec<u8>>, _>(index)
            .ok()
            .flatten()
            .map(Value::Bytes)
            .unwrap_or(Value::Null),

        // TEXT and anything else: fall back to string.
        _ => row
            .try_get::<Option<String>, _>(index)
            .ok()
            .flatten()
            .map(Value::Text)
            .unwrap_or(Value::Null),
    }
}

/// Formats a sqlx error, preferring the engine's own message.
fn format_query_error(error: sqlx::Error) -> String {
    match error.as_database_error() {
        Some(db_error) => db_error.message().to_string(),
        None => error.to_string(),
    }
}
