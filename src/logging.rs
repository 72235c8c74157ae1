use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::config::data_dir;
use crate::error::AppError;

const LOG_FILE_NAME: &str = "jungle-snake.log";

/// Returns the default log file path.
#[must_use]
pub fn default_log_path() -> PathBuf {
    data_dir().join(LOG_FILE_NAME)
}

/// Installs the global tracing subscriber, appending to `path`.
///
/// The terminal is owned by the game, so logs always go to a file. `RUST_LOG`
/// takes precedence over `default_level`.
pub fn init(path: &Path, default_level: &str) -> Result<(), AppError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .map_err(|error| AppError::Logging(error.to_string()))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .map_err(|error| AppError::Logging(error.to_string()))
}
