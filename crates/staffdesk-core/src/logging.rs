//! Tracing bootstrap.
//!
//! Logs go to `$STAFFDESK_HOME/logs/staffdesk.log` so command output on
//! stdout stays clean.

use std::env;
use std::path::Path;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "staffdesk=info,staffdesk_core=info";
const LOG_FILE: &str = "staffdesk.log";

/// Environment variable consulted after `RUST_LOG`.
pub const LOG_ENV: &str = "STAFFDESK_LOG";

/// Installs the global subscriber writing to `<logs_dir>/staffdesk.log`.
///
/// The returned guard flushes buffered lines on drop; keep it alive for the
/// lifetime of the process. A subscriber that is already installed is left
/// in place.
///
/// # Errors
/// Returns an error if the log directory cannot be created.
pub fn init(logs_dir: &Path, config_filter: Option<&str>) -> Result<WorkerGuard> {
    std::fs::create_dir_all(logs_dir)
        .with_context(|| format!("Failed to create log directory {}", logs_dir.display()))?;

    let appender = tracing_appender::rolling::never(logs_dir, LOG_FILE);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let _ = tracing_subscriber::fmt()
        .with_target(true)
        .with_ansi(false)
        .with_writer(writer)
        .with_env_filter(resolve_filter(
            env::var("RUST_LOG").ok().as_deref(),
            env::var(LOG_ENV).ok().as_deref(),
            config_filter,
        ))
        .try_init();

    Ok(guard)
}

/// Picks the first usable directive: `RUST_LOG` > `STAFFDESK_LOG` > config > default.
fn resolve_filter(
    rust_log: Option<&str>,
    app_log: Option<&str>,
    config_filter: Option<&str>,
) -> EnvFilter {
    for candidate in [rust_log, app_log, config_filter].into_iter().flatten() {
        if candidate.trim().is_empty() {
            continue;
        }
        if let Ok(filter) = EnvFilter::try_new(candidate) {
            return filter;
        }
    }

    EnvFilter::new(DEFAULT_FILTER)
}
