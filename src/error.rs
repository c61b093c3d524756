//! Error types for sqlcheck.
//!
//! Defines the main error enum used throughout the crate.

use thiserror::Error;

/// Main error type for sqlcheck operations.
#[derive(Error, Debug)]
pub enum CheckError {
    /// The exercise id has no stored expected result.
    #[error("Unknown exercise '{0}'. This exercise may not be set up yet.")]
    UnknownExercise(String),

    /// Candidate SQL failed to parse or execute. Carries the engine's message.
    #[error("SQL error: {0}")]
    Query(String),

    /// Database file missing or could not be opened.
    #[error("Database error: {0}")]
    Database(String),

    /// Expected-results store could not be read or written.
    #[error("Store error: {0}")]
    Store(String),

    /// Configuration errors (invalid config file, bad paths, etc.)
    #[error("Configuration error: {0}")]
    Config(String),
}

impl CheckError {
    /// Creates a query error with the given message.
    pub fn query(msg: impl Into<String>) -> Self {
        Self::Query(msg.into())
    }

    /// Creates a database error with the given message.
    pub fn database(msg: impl Into<String>) -> Self {
        Self::Database(msg.into())
    }

    /// Creates a store error with the given message.
    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::UnknownExercise(_) => "Unknown Exercise",
            Self::Query(_) => "SQL Error",
            Self::Database(_) => "Database Error",
            Self::Store(_) => "Store Error",
            Self::Config(_) => "Configuration Error",
        }
    }
}

/// Result type alias using CheckError.
pub type Result<T> = std::result::Result<T, CheckError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_unknown_exercise() {
        let err = CheckError::UnknownExercise("ex_99".to_string());
        assert_eq!(
            err.to_string(),
            "Unknown exercise 'ex_99'. This exercise may not be set up yet."
        );
        assert_eq!(err.category(), "Unknown Exercise");
    }

    #[test]
    fn test_error_display_query() {
        let err = CheckError::query("no such table: employes");
        assert_eq!(err.to_string(), "SQL error: no such table: employes");
        assert_eq!(err.category(), "SQL Error");
    }

    #[test]
    fn test_error_display_database() {
        let err = CheckError::database("practice.db not found");
        assert_eq!(err.to_string(), "Database error: practice.db not found");
        assert_eq!(err.category(), "Database Error");
    }

    #[test]
    fn test_error_display_store() {
        let err = CheckError::store("malformed expected results file");
        assert_eq!(
            err.to_string(),
            "Store error: malformed expected results file"
        );
        assert_eq!(err.category(), "Store Error");
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CheckError>();
    }
}
