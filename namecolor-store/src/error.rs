//! Typed error variants for the namecolor-store crate.
//!
//! None of these ever reach callers of `get`/`set`/`remove`; they are logged
//! on the flush path. `flush_sync` and the `DataFile` / `TaskScheduler` seams
//! return them so hosts can report shutdown failures.

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while loading, rendering, or persisting player data.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading, creating, or writing the data file failed.
    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        /// Location of the data file (as reported by the `DataFile`).
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The data file did not contain a valid YAML document.
    #[error("YAML parse error in player data: {0}")]
    Parse(#[source] serde_yaml_ng::Error),

    /// The in-memory document could not be rendered back to YAML.
    #[error("failed to render player data: {0}")]
    Render(#[source] serde_yaml_ng::Error),

    /// Rendering produced blank output; the write was skipped so the file
    /// on disk is not truncated.
    #[error("rendered player data is empty; refusing to overwrite '{}'", path.display())]
    EmptyContent {
        /// Location of the data file that was left untouched.
        path: PathBuf,
    },

    /// The background scheduler refused a flush task.
    #[error("failed to schedule flush: {0}")]
    Scheduler(String),
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StoreError>;
