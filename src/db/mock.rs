//! Mock database clients for testing.
//!
//! `MockDatabaseClient` returns canned results keyed by the exact SQL text;
//! `FailingDatabaseClient` fails every query, for error-path tests.

use super::{DatabaseClient, QueryResult, TableColumn};
use crate::error::{CheckError, Result};
use async_trait::async_trait;
use std::collections::HashMap;

/// A mock database client that returns predefined results.
#[derive(Default)]
pub struct MockDatabaseClient {
    results: HashMap<String, QueryResult>,
}

impl MockDatabaseClient {
    /// Creates a mock client with no canned results.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a canned result for the given SQL text.
    pub fn with_result(mut self, sql: impl Into<String>, result: QueryResult) -> Self {
        self.results.insert(sql.into(), result);
        self
    }
}

#[async_trait]
impl DatabaseClient for MockDatabaseClient {
    async fn execute_query(&self, sql: &str) -> Result<QueryResult> {
        match self.results.get(sql) {
            Some(result) => Ok(result.clone()),
            None => Err(CheckError::query(format!("no canned result for: {sql}"))),
        }
    }

    async fn list_tables(&self) -> Result<Vec<String>> {
        Ok(Vec::new())
    }

    async fn describe_table(&self, table: &str) -> Result<Vec<TableColumn>> {
        Err(CheckError::query(format!("No such table: {table}")))
    }

    async fn preview_table(&self, table: &str, _limit: u32) -> Result<QueryResult> {
        Err(CheckError::query(format!("No such table: {table}")))
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }
}

/// A client whose every query fails with the configured engine message.
pub struct FailingDatabaseClient {
    message: String,
}

impl FailingDatabaseClient {
    /// Creates a failing client with the given engine error message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[async_trait]
impl DatabaseClient for FailingDatabaseClient {
    async fn execute_query(&self, _sql: &str) -> Result<QueryResult> {
        Err(CheckError::query(self.message.clone()))
    }

    async fn list_tables(&self) -> Result<Vec<String>> {
        Err(CheckError::query(self.message.clone()))
    }

    async fn describe_table(&self, _table: &str) -> Result<Vec<TableColumn>> {
        Err(CheckError::query(self.message.clone()))
    }

    async fn preview_table(&self, _table: &str, _limit: u32) -> Result<QueryResult> {
        Err(CheckError::query(self.message.clone()))
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }
}
