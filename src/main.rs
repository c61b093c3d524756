//! sqlcheck - answer checker for SQL practice notebooks.

mod cli;
mod logging;

use cli::{Cli, Command};
use sqlcheck::checker::Checker;
use sqlcheck::config::Config;
use sqlcheck::db::{DatabaseClient, SqliteClient};
use sqlcheck::error::{CheckError, Result};
use sqlcheck::generator;
use sqlcheck::store::ExpectedStore;
use std::io::Read;
use tracing::error;

#[tokio::main]
async fn main() {
    logging::init_stderr_logging();

    if let Err(e) = run().await {
        error!("{}: {}", e.category(), e);
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse_args();

    let mut config = Config::load_from_file(&cli.config_path())?;
    if let Some(db) = &cli.database {
        config.database = db.clone();
    }

    match &cli.command {
        Command::Check {
            notebook,
            exercise,
            query,
            file,
        } => {
            let sql = resolve_query(query.as_deref(), file.as_deref())?;
            let checker = open_checker(&config, notebook).await?;
            let verdict = checker.check(exercise, &sql).await?;
            println!("{exercise}: {verdict}");
            checker.close().await?;
            if !verdict.passed() {
                std::process::exit(1);
            }
        }

        Command::Run { notebook } => {
            let failed = run_notebooks(&config, notebook.as_deref()).await?;
            if failed > 0 {
                std::process::exit(1);
            }
        }

        Command::Generate { notebook } => {
            let client = SqliteClient::open(&config.database).await?;
            let notebooks = match notebook {
                Some(name) => vec![name.clone()],
                None => generator::list_notebooks(&config.solutions_dir)?,
            };
            for name in &notebooks {
                let count = generator::generate_notebook(
                    &client,
                    &config.solutions_dir,
                    &config.expected_dir,
                    name,
                )
                .await?;
                println!("{name}: wrote {count} expected result(s)");
            }
            client.close().await?;
        }

        Command::Hint { notebook, exercise } => {
            let store = ExpectedStore::load(&config.expected_dir, notebook)?;
            let hints = &store.get(exercise)?.hints;
            if hints.is_empty() {
                println!("No hints available for '{exercise}'");
            } else {
                println!("Hints for {exercise}:");
                for hint in hints {
                    println!("  - {hint}");
                }
            }
        }

        Command::Tables => {
            let client = SqliteClient::open(&config.database).await?;
            for table in client.list_tables().await? {
                println!("{table}");
            }
            client.close().await?;
        }

        Command::Describe { table } => {
            let client = SqliteClient::open(&config.database).await?;
            for col in client.describe_table(table).await? {
                let nullable = if col.is_nullable { "" } else { " NOT NULL" };
                let pk = if col.is_primary_key { " PRIMARY KEY" } else { "" };
                println!("{} {}{}{}", col.name, col.data_type, nullable, pk);
            }
            client.close().await?;
        }

        Command::Preview { table, limit } => {
            let client = SqliteClient::open(&config.database).await?;
            let result = client.preview_table(table, *limit).await?;
            println!("{}", result.column_names().join(" | "));
            for row in &result.rows {
                let cells: Vec<String> = row.iter().map(|v| v.to_display_string()).collect();
                println!("{}", cells.join(" | "));
            }
            client.close().await?;
        }
    }

    Ok(())
}

/// Reads the candidate query from the --query argument, a file, or stdin.
fn resolve_query(query: Option<&str>, file: Option<&str>) -> Result<String> {
    match (query, file) {
        (Some(sql), _) => Ok(sql.to_string()),
        (None, Some("-")) => {
            let mut sql = String::new();
            std::io::stdin()
                .read_to_string(&mut sql)
                .map_err(|e| CheckError::query(format!("Failed to read query from stdin: {e}")))?;
            Ok(sql)
        }
        (None, Some(path)) => std::fs::read_to_string(path)
            .map_err(|e| CheckError::query(format!("Failed to read query from {path}: {e}"))),
        (None, None) => Err(CheckError::query(
            "No query given. Pass --query or --file.",
        )),
    }
}

/// Opens a checker for one notebook over the configured practice database.
async fn open_checker(config: &Config, notebook: &str) -> Result<Checker> {
    let client = SqliteClient::open(&config.database).await?;
    let store = ExpectedStore::load(&config.expected_dir, notebook)?;
    Ok(Checker::new(Box::new(client), store))
}

/// Runs every exercise's solution query through the checker and prints
/// aggregate pass/fail counts. Returns the number of non-passing exercises.
async fn run_notebooks(config: &Config, notebook: Option<&str>) -> Result<usize> {
    let notebooks = match notebook {
        Some(name) => vec![name.to_string()],
        None => generator::list_notebooks(&config.solutions_dir)?,
    };

    let mut passed = 0usize;
    let mut failed = 0usize;

    for name in &notebooks {
        let solutions = generator::load_solutions(&config.solutions_dir, name)?;
        let checker = open_checker(config, name).await?;

        for (exercise_id, solution) in &solutions {
            // A broken solution query or missing expected result counts as a
            // failure in the aggregate; the run itself keeps going.
            match checker.check(exercise_id, &solution.query).await {
                Ok(verdict) if verdict.passed() => {
                    passed += 1;
                    println!("{name}/{exercise_id}: PASS");
                }
                Ok(verdict) => {
                    failed += 1;
                    println!("{name}/{exercise_id}: {verdict}");
                }
                Err(e) => {
                    failed += 1;
                    println!("{name}/{exercise_id}: ERROR: {e}");
                }
            }
        }

        checker.close().await?;
    }

    println!("\n{passed} passed, {failed} failed");
    Ok(failed)
}
