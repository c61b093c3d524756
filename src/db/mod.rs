//! Database abstraction layer.
//!
//! Provides a trait-based interface over the embedded practice database so
//! the checker can be exercised against mock backends in tests.

mod mock;
mod sqlite;
mod types;

pub use mock::{FailingDatabaseClient, MockDatabaseClient};
pub use sqlite::SqliteClient;
pub use types::{ColumnInfo, QueryResult, Row, Value};

use crate::error::Result;
use async_trait::async_trait;

/// Description of one column of a practice table, as reported by the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct TableColumn {
    pub name: String,
    pub data_type: String,
    pub is_nullable: bool,
    pub is_primary_key: bool,
}

/// Trait defining the interface for database clients.
///
/// The checking path only ever reads; implementations open the practice
/// database read-only so a stray candidate query cannot mutate it.
#[async_trait]
pub trait DatabaseClient: Send + Sync {
    /// Executes a SQL query and returns the results.
    async fn execute_query(&self, sql: &str) -> Result<QueryResult>;

    /// Lists the names of all tables in the practice database.
    async fn list_tables(&self) -> Result<Vec<String>>;

    /// Describes the columns of a single table.
    async fn describe_table(&self, table: &str) -> Result<Vec<TableColumn>>;

    /// Returns the first `limit` rows of a table, for learner previews.
    async fn preview_table(&self, table: &str, limit: u32) -> Result<QueryResult>;

    /// Closes the database connection.
    async fn close(&self) -> Result<()>;
}
