//! Persistent storage
//!
//! Locates the application data directory and reads settings from it.

pub mod settings;

use directories::ProjectDirs;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading or writing application files
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("could not determine the application data directory")]
    NoDataDir,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Platform data directory for the app (e.g. `~/.local/share/invincix-chat`)
pub fn get_data_dir() -> Result<PathBuf, StorageError> {
    ProjectDirs::from("com", "invincix", "invincix-chat")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or(StorageError::NoDataDir)
}
