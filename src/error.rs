use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures surfaced by the binary before or while driving the terminal.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid settings file {}: {source}", .path.display())]
    Settings {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    #[error("failed to initialize logging: {0}")]
    Logging(String),
}
