//! Configuration management for sqlcheck.
//!
//! Handles loading path configuration from a TOML file with environment
//! variable defaults, so notebooks and the CLI agree on where the practice
//! database, solutions, and expected results live.

use crate::error::{CheckError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure for sqlcheck.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Path to the practice database file.
    #[serde(default = "default_database")]
    pub database: PathBuf,

    /// Directory holding one expected-results JSON file per notebook.
    #[serde(default = "default_expected_dir")]
    pub expected_dir: PathBuf,

    /// Directory holding one solutions TOML file per notebook.
    #[serde(default = "default_solutions_dir")]
    pub solutions_dir: PathBuf,
}

fn default_database() -> PathBuf {
    PathBuf::from("data/databases/practice.db")
}

fn default_expected_dir() -> PathBuf {
    PathBuf::from("tests/expected_results")
}

fn default_solutions_dir() -> PathBuf {
    PathBuf::from("solutions")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: default_database(),
            expected_dir: default_expected_dir(),
            solutions_dir: default_solutions_dir(),
        }
    }
}

impl Config {
    /// Returns the default config file path for the current platform.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("sqlcheck")
            .join("config.toml")
    }

    /// Loads configuration from a TOML file.
    ///
    /// A missing file yields the defaults; notebooks checked out at the repo
    /// root need no config at all.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            let mut config = Self::default();
            config.apply_env_defaults();
            return Ok(config);
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| CheckError::config(format!("Failed to read config file: {e}")))?;

        let mut config: Config = toml::from_str(&content).map_err(|e| {
            CheckError::config(format!("Configuration error in {}:\n  {}", path.display(), e))
        })?;
        config.apply_env_defaults();
        Ok(config)
    }

    /// Applies environment variable overrides (`SQLCHECK_DB`,
    /// `SQLCHECK_EXPECTED_DIR`, `SQLCHECK_SOLUTIONS_DIR`).
    pub fn apply_env_defaults(&mut self) {
        if let Ok(db) = std::env::var("SQLCHECK_DB") {
            self.database = PathBuf::from(db);
        }
        if let Ok(dir) = std::env::var("SQLCHECK_EXPECTED_DIR") {
            self.expected_dir = PathBuf::from(dir);
        }
        if let Ok(dir) = std::env::var("SQLCHECK_SOLUTIONS_DIR") {
            self.solutions_dir = PathBuf::from(dir);
        }
    }
}
