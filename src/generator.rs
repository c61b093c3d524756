//! Expected-result generator.
//!
//! Offline maintainer step: runs each notebook's solution queries against the
//! practice database, normalizes the results, and writes the expected-results
//! store the checker consumes. Never invoked at check time.

use crate::db::DatabaseClient;
use crate::error::{CheckError, Result};
use crate::normalize::{normalize, ComparisonPolicy};
use crate::store::{ExpectedResult, ExpectedStore};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::info;

/// One solution entry from a notebook's solutions file.
#[derive(Debug, Clone, Deserialize)]
pub struct Solution {
    /// The reference SQL query.
    pub query: String,

    /// Whether row order matters when grading this exercise.
    #[serde(default)]
    pub policy: ComparisonPolicy,

    /// Hints surfaced to learners, never the query itself.
    #[serde(default)]
    pub hints: Vec<String>,
}

/// Solutions for one notebook, keyed by exercise id.
pub type Solutions = BTreeMap<String, Solution>;

/// Loads the solutions file at `<dir>/<notebook>.toml`.
pub fn load_solutions(dir: &Path, notebook: &str) -> Result<Solutions> {
    let path = dir.join(format!("{notebook}.toml"));
    let content = fs::read_to_string(&path)
        .map_err(|e| CheckError::store(format!("Failed to read {}: {e}", path.display())))?;

    toml::from_str(&content)
        .map_err(|e| CheckError::store(format!("Malformed {}: {e}", path.display())))
}

/// Lists notebooks that have a solutions file in `dir`, in sorted order.
pub fn list_notebooks(dir: &Path) -> Result<Vec<String>> {
    let entries = fs::read_dir(dir)
        .map_err(|e| CheckError::store(format!("Failed to read {}: {e}", dir.display())))?;

    let mut notebooks = Vec::new();
    for entry in entries {
        let entry =
            entry.map_err(|e| CheckError::store(format!("Failed to read directory entry: {e}")))?;
        let path = entry.path();
        if path.extension().is_some_and(|ext| ext == "toml") {
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                notebooks.push(stem.to_string());
            }
        }
    }

    notebooks.sort();
    Ok(notebooks)
}

/// Runs every solution query for a notebook and builds its expected store.
///
/// A solution query that fails to execute aborts generation for the whole
/// notebook; stale expected results are worse than missing ones.
pub async fn generate(
    client: &dyn DatabaseClient,
    notebook: &str,
    solutions: &Solutions,
) -> Result<ExpectedStore> {
    if solutions.is_empty() {
        return Err(CheckError::store(format!(
            "No exercises found in solutions for notebook '{notebook}'"
        )));
    }

    let mut exercises = BTreeMap::new();
    for (exercise_id, solution) in solutions {
        let result = client.execute_query(&solution.query).await.map_err(|e| {
            CheckError::store(format!(
                "Solution query for '{exercise_id}' failed: {e}"
            ))
        })?;

        let normalized = normalize(&result, solution.policy);
        info!(
            exercise = exercise_id.as_str(),
            rows = normalized.row_count,
            columns = normalized.columns.len(),
            "Generated expected result"
        );

        exercises.insert(
            exercise_id.clone(),
            ExpectedResult::from_normalized(&normalized, solution.policy, solution.hints.clone()),
        );
    }

    Ok(ExpectedStore::from_exercises(notebook, exercises))
}

/// Convenience wrapper: load solutions, generate, and persist the store.
pub async fn generate_notebook(
    client: &dyn DatabaseClient,
    solutions_dir: &Path,
    expected_dir: &Path,
    notebook: &str,
) -> Result<usize> {
    let solutions = load_solutions(solutions_dir, notebook)?;
    let store = generate(client, notebook, &solutions).await?;
    let path = store.save(expected_dir)?;
    info!(
        notebook,
        exercises = store.len(),
        "Wrote expected results to {}",
        path.display()
    );
    Ok(store.len())
}
