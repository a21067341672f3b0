//! Diagnostic logging.
//!
//! stdout and stderr carry the committed result and query, and the terminal
//! carries the UI, so logs only ever go to a file. Nothing is installed unless
//! a log file is requested; `tracing` macros are then no-ops.

use std::path::Path;

use anyhow::{Context, Result, anyhow};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the `EnvFilter` directives.
pub const LOG_FILTER_ENV: &str = "PREQ_LOG";

const DEFAULT_FILTER: &str = "info";

/// Installs a file subscriber writing to `path`.
///
/// Keep the returned guard alive until exit so buffered lines get flushed.
///
/// # Errors
/// Returns an error if the log file cannot be created or a global subscriber
/// is already set.
pub fn init(path: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let Some(path) = path else {
        return Ok(None);
    };

    let file_name = path
        .file_name()
        .with_context(|| format!("log path '{}' has no file name", path.display()))?;
    let dir = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir)
        .with_context(|| format!("create log directory '{}'", dir.display()))?;

    let appender = tracing_appender::rolling::never(dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let filter =
        EnvFilter::try_from_env(LOG_FILTER_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .map_err(|err| anyhow!("install log subscriber: {err}"))?;

    Ok(Some(guard))
}
