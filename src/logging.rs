//! Logging configuration for sqlcheck.
//!
//! Logs go to stderr so notebook cells and the test runner can capture
//! verdict output on stdout unmixed.

use tracing_subscriber::EnvFilter;

/// Initializes stderr logging with `RUST_LOG` filtering (default `warn`).
///
/// Defaults quieter than a long-running service would: learners only want
/// verdicts, not tracing noise.
pub fn init_stderr_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}
