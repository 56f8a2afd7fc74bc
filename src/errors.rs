// src/errors.rs

//! Crate-wide error types and aliases.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlaylistDlError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Invalid selection: {0}")]
    SelectionError(String),

    #[error("Downloader binary '{0}' not found in PATH")]
    BinaryNotFound(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Failure to start the external download process.
///
/// A spawn failure is local to the task that requested it: the task goes
/// straight to `Failed` and the orchestrator keeps running.
#[derive(Error, Debug)]
pub enum SpawnError {
    #[error("executable '{}' not found", program.display())]
    NotFound { program: PathBuf },

    #[error("failed to spawn '{}': {source}", program.display())]
    Io {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A backend declined to start the process (for example because the
    /// arguments are not acceptable to it). No OS error is involved.
    #[error("{0}")]
    Rejected(String),
}

impl SpawnError {
    /// Classify an IO error returned by `Command::spawn`.
    pub fn from_io(program: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let program = program.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            SpawnError::NotFound { program }
        } else {
            SpawnError::Io { program, source }
        }
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, PlaylistDlError>;
