//! sqlcheck - answer checker for SQL practice notebooks.
//!
//! Executes candidate queries against a read-only practice database,
//! normalizes the results, and compares them to stored expected results
//! without revealing the answers.

pub mod checker;
pub mod config;
pub mod db;
pub mod error;
pub mod generator;
pub mod normalize;
pub mod store;
