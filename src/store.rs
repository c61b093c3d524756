//! Expected-results store.
//!
//! One JSON file per notebook, mapping exercise ids to the expected
//! normalized result (digest + structure) and the exercise's comparison
//! policy. Written offline by the generator, read-only at check time.

use crate::error::{CheckError, Result};
use crate::normalize::{ComparisonPolicy, NormalizedResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Stored expected result for one exercise.
///
/// Holds only structure and a digest, never the expected cell values.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExpectedResult {
    /// Truncated digest of the canonical result stream.
    pub hash: String,

    /// Expected number of rows.
    pub row_count: usize,

    /// Expected column names, in order.
    pub columns: Vec<String>,

    /// Whether row order is significant for this exercise.
    #[serde(default)]
    pub policy: ComparisonPolicy,

    /// Optional hints shown to the learner on request or on failure.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hints: Vec<String>,
}

impl ExpectedResult {
    /// Builds an expected result from a normalized result and policy.
    pub fn from_normalized(
        normalized: &NormalizedResult,
        policy: ComparisonPolicy,
        hints: Vec<String>,
    ) -> Self {
        Self {
            hash: normalized.digest.clone(),
            row_count: normalized.row_count,
            columns: normalized.columns.clone(),
            policy,
            hints,
        }
    }
}

/// Expected results for one notebook, keyed by exercise id.
#[derive(Debug, Clone, Default)]
pub struct ExpectedStore {
    notebook: String,
    exercises: BTreeMap<String, ExpectedResult>,
}

impl ExpectedStore {
    /// Loads the store for a notebook from `<dir>/<notebook>.json`.
    ///
    /// A missing file is not an error: it yields an empty store, and every
    /// lookup then fails with `UnknownExercise`.
    pub fn load(dir: &Path, notebook: &str) -> Result<Self> {
        let path = Self::file_path(dir, notebook);
        if !path.exists() {
            debug!("No expected results file at {}", path.display());
            return Ok(Self {
                notebook: notebook.to_string(),
                exercises: BTreeMap::new(),
            });
        }

        let content = fs::read_to_string(&path)
            .map_err(|e| CheckError::store(format!("Failed to read {}: {e}", path.display())))?;
        let exercises: BTreeMap<String, ExpectedResult> = serde_json::from_str(&content)
            .map_err(|e| CheckError::store(format!("Malformed {}: {e}", path.display())))?;

        debug!(
            "Loaded {} expected result(s) for notebook '{notebook}'",
            exercises.len()
        );
        Ok(Self {
            notebook: notebook.to_string(),
            exercises,
        })
    }

    /// Builds a store in memory, for the generator and for tests.
    pub fn from_exercises(
        notebook: impl Into<String>,
        exercises: BTreeMap<String, ExpectedResult>,
    ) -> Self {
        Self {
            notebook: notebook.into(),
            exercises,
        }
    }

    /// Writes the store to `<dir>/<notebook>.json`, creating the directory
    /// if needed. Only the generator calls this.
    pub fn save(&self, dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(dir)
            .map_err(|e| CheckError::store(format!("Failed to create {}: {e}", dir.display())))?;

        let path = Self::file_path(dir, &self.notebook);
        let content = serde_json::to_string_pretty(&self.exercises)
            .map_err(|e| CheckError::store(format!("Failed to serialize store: {e}")))?;
        fs::write(&path, content)
            .map_err(|e| CheckError::store(format!("Failed to write {}: {e}", path.display())))?;

        Ok(path)
    }

    /// Returns the notebook this store belongs to.
    pub fn notebook(&self) -> &str {
        &self.notebook
    }

    /// Looks up the expected result for an exercise id.
    pub fn get(&self, exercise_id: &str) -> Result<&ExpectedResult> {
        self.exercises
            .get(exercise_id)
            .ok_or_else(|| CheckError::UnknownExercise(exercise_id.to_string()))
    }

    /// Iterates over all exercise ids in the store, in sorted order.
    pub fn exercise_ids(&self) -> impl Iterator<Item = &str> {
        self.exercises.keys().map(String::as_str)
    }

    /// Returns the number of exercises in the store.
    pub fn len(&self) -> usize {
        self.exercises.len()
    }

    /// Returns true if the store has no exercises.
    pub fn is_empty(&self) -> bool {
        self.exercises.is_empty()
    }

    fn file_path(dir: &Path, notebook: &str) -> PathBuf {
        dir.join(format!("{notebook}.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn sample_expected() -> ExpectedResult {
        ExpectedResult {
            hash: "ab12cd34ef56ab12".to_string(),
            row_count: 5,
            columns: vec!["department_id".to_string(), "department_name".to_string()],
            policy: ComparisonPolicy::OrderSensitive,
            hints: vec!["Use ORDER BY".to_string()],
        }
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempdir().unwrap();
        let mut exercises = BTreeMap::new();
        exercises.insert("ex_01".to_string(), sample_expected());

        let store = ExpectedStore::from_exercises("01_select_basics", exercises);
        let path = store.save(dir.path()).unwrap();
        assert!(path.ends_with("01_select_basics.json"));

        let loaded = ExpectedStore::load(dir.path(), "01_select_basics").unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded.get("ex_01").unwrap(), &sample_expected());
    }

    #[test]
    fn test_missing_file_is_empty_store() {
        let dir = tempdir().unwrap();
        let store = ExpectedStore::load(dir.path(), "nonexistent_notebook").unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_unknown_exercise_lookup() {
        let store = ExpectedStore::from_exercises("nb", BTreeMap::new());
        let err = store.get("ex_99").unwrap_err();
        assert!(matches!(err, CheckError::UnknownExercise(_)));
    }

    #[test]
    fn test_malformed_file_is_store_error() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("broken.json"), "{not json").unwrap();

        let err = ExpectedStore::load(dir.path(), "broken").unwrap_err();
        assert!(matches!(err, CheckError::Store(_)));
    }

    #[test]
    fn test_policy_defaults_to_order_insensitive() {
        let json = r#"{"hash": "0011223344556677", "row_count": 0, "columns": []}"#;
        let expected: ExpectedResult = serde_json::from_str(json).unwrap();
        assert_eq!(expected.policy, ComparisonPolicy::OrderInsensitive);
        assert!(expected.hints.is_empty());
    }
}
