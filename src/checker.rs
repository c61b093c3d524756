//! Query checker.
//!
//! Executes a candidate query against the practice database, normalizes the
//! result under the exercise's comparison policy, and compares the digest
//! against the stored expected result. Verdicts describe the mismatch class
//! (columns, row count, values) without ever revealing expected cell values.

use crate::db::DatabaseClient;
use crate::error::{CheckError, Result};
use crate::normalize::{normalize, NormalizedResult};
use crate::store::{ExpectedResult, ExpectedStore};
use std::collections::BTreeSet;
use std::fmt;
use tracing::{debug, info};

/// Outcome of checking one exercise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// The normalized result matched the stored expected result.
    Pass {
        /// Rows the candidate query returned.
        row_count: usize,
    },
    /// The normalized result did not match.
    Fail {
        /// Structural hints for the learner; never contain expected values.
        diagnostics: Vec<String>,
    },
}

impl Verdict {
    /// Returns true if the check passed.
    pub fn passed(&self) -> bool {
        matches!(self, Verdict::Pass { .. })
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Pass { row_count } => {
                write!(f, "PASS: query returned {row_count} row(s) with correct results")
            }
            Verdict::Fail { diagnostics } => {
                write!(f, "FAIL")?;
                for d in diagnostics {
                    write!(f, "\n  - {d}")?;
                }
                Ok(())
            }
        }
    }
}

/// Validates candidate queries against stored expected results.
///
/// Holds a read-only database client and the expected-results store for one
/// notebook. Checking is idempotent and never mutates practice tables.
pub struct Checker {
    client: Box<dyn DatabaseClient>,
    store: ExpectedStore,
}

impl Checker {
    /// Creates a checker over the given client and expected-results store.
    pub fn new(client: Box<dyn DatabaseClient>, store: ExpectedStore) -> Self {
        Self { client, store }
    }

    /// Checks a candidate query against the expected result for an exercise.
    ///
    /// Errors are not verdicts: an unknown exercise id or a query the engine
    /// rejects aborts the check and surfaces to the caller. A well-formed
    /// query whose result differs yields `Verdict::Fail`.
    pub async fn check(&self, exercise_id: &str, query: &str) -> Result<Verdict> {
        if query.trim().is_empty() {
            return Err(CheckError::query(format!(
                "Empty query for '{exercise_id}'. Write your SQL query and try again."
            )));
        }

        let expected = self.store.get(exercise_id)?;
        let result = self.client.execute_query(query).await?;
        let actual = normalize(&result, expected.policy);

        debug!(
            exercise = exercise_id,
            rows = actual.row_count,
            digest = %actual.digest,
            "Normalized candidate result"
        );

        if actual.digest == expected.hash
            && actual.columns == expected.columns
            && actual.row_count == expected.row_count
        {
            info!(exercise = exercise_id, "PASS");
            Ok(Verdict::Pass {
                row_count: actual.row_count,
            })
        } else {
            info!(exercise = exercise_id, "FAIL");
            Ok(Verdict::Fail {
                diagnostics: diagnose(expected, &actual),
            })
        }
    }

    /// Returns the stored hints for an exercise without revealing the answer.
    pub fn hints(&self, exercise_id: &str) -> Result<&[String]> {
        Ok(&self.store.get(exercise_id)?.hints)
    }

    /// Returns the notebook this checker grades.
    pub fn notebook(&self) -> &str {
        self.store.notebook()
    }

    /// Returns the exercise ids this checker knows about.
    pub fn exercise_ids(&self) -> Vec<String> {
        self.store.exercise_ids().map(String::from).collect()
    }

    /// Closes the underlying database connection.
    pub async fn close(&self) -> Result<()> {
        self.client.close().await
    }
}

/// Builds learner-facing diagnostics for a mismatch.
///
/// Checks columns first, then row count, then falls back to a generic
/// values-differ message, mirroring the order a learner should debug in.
fn diagnose(expected: &ExpectedResult, actual: &NormalizedResult) -> Vec<String> {
    let mut diagnostics = Vec::new();

    if actual.columns != expected.columns {
        let expected_set: BTreeSet<&String> = expected.columns.iter().collect();
        let actual_set: BTreeSet<&String> = actual.columns.iter().collect();

        if expected_set == actual_set {
            diagnostics.push(format!(
                "Columns are correct but in the wrong order. Expected order: {:?}",
                expected.columns
            ));
        } else {
            let missing: Vec<&&String> = expected_set.difference(&actual_set).collect();
            let extra: Vec<&&String> = actual_set.difference(&expected_set).collect();
            if !missing.is_empty() {
                diagnostics.push(format!("Missing columns: {missing:?}"));
            }
            if !extra.is_empty() {
                diagnostics.push(format!("Extra columns not expected: {extra:?}"));
            }
        }
    } else if actual.row_count != expected.row_count {
        if actual.row_count > expected.row_count {
            diagnostics.push(format!(
                "Too many rows. Expected {}, got {}. Check your WHERE conditions.",
                expected.row_count, actual.row_count
            ));
        } else {
            diagnostics.push(format!(
                "Too few rows. Expected {}, got {}. Your filter may be too restrictive.",
                expected.row_count, actual.row_count
            ));
        }
    } else {
        diagnostics.push(
            "Row count and columns match, but values differ. \
             Check your calculations, joins, or sorting."
                .to_string(),
        );
    }

    if let Some(hint) = expected.hints.first() {
        diagnostics.push(format!("Tip: {hint}"));
    }

    diagnostics
}
