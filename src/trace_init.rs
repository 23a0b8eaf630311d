use std::fs;
use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

pub const LOG_FILE_NAME: &str = "dotdash.log";
const DEFAULT_FILTER: &str = "dotdash=info";

pub fn default_log_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("dotdash")
}

/// The terminal UI owns stdout, so events go to `dotdash.log` in `log_dir`.
/// Keep the returned guard alive until exit or buffered lines are lost.
/// Returns `None` when the directory cannot be created or a subscriber is
/// already installed.
pub fn init_tracing(log_dir: &Path) -> Option<WorkerGuard> {
    fs::create_dir_all(log_dir).ok()?;

    let file_appender = tracing_appender::rolling::never(log_dir, LOG_FILE_NAME);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)),
        )
        .try_init()
        .ok()?;

    Some(guard)
}
