//! Command-line argument parsing for sqlcheck.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Answer checker for SQL practice notebooks.
#[derive(Parser, Debug)]
#[command(name = "sqlcheck")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Practice database file (overrides config)
    #[arg(long, value_name = "PATH", env = "SQLCHECK_DB")]
    pub database: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Check one candidate query against an exercise's expected result
    Check {
        /// Notebook name (e.g., "01_select_basics")
        #[arg(short, long, env = "SQLCHECK_NOTEBOOK")]
        notebook: String,

        /// Exercise identifier (e.g., "ex_01")
        #[arg(short, long)]
        exercise: String,

        /// SQL query text
        #[arg(short, long, conflicts_with = "file")]
        query: Option<String>,

        /// Read the SQL query from a file (use "-" for stdin)
        #[arg(short, long)]
        file: Option<String>,
    },

    /// Run every stored exercise's solution query and report aggregate counts
    Run {
        /// Notebook to run; all notebooks if omitted
        notebook: Option<String>,
    },

    /// Regenerate expected results from solution queries
    Generate {
        /// Notebook to regenerate; all notebooks if omitted
        notebook: Option<String>,
    },

    /// Show the hints for an exercise
    Hint {
        /// Notebook name
        #[arg(short, long, env = "SQLCHECK_NOTEBOOK")]
        notebook: String,

        /// Exercise identifier
        #[arg(short, long)]
        exercise: String,
    },

    /// List the tables in the practice database
    Tables,

    /// Show the schema of one practice table
    Describe {
        /// Table name
        table: String,
    },

    /// Show the first few rows of one practice table
    Preview {
        /// Table name
        table: String,

        /// Number of rows to show
        #[arg(short, long, default_value_t = 5)]
        limit: u32,
    },
}

impl Cli {
    /// Parses command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Returns the config file path to use.
    pub fn config_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(sqlcheck::config::Config::default_path)
    }
}
