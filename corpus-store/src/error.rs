//! Error types for corpus-store.

use std::path::PathBuf;

use thiserror::Error;

use corpus_core::{Collection, RecordId};

/// All errors that can arise from document store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization error on the write path.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A collection or session file on disk did not parse.
    #[error("failed to parse {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The addressed document does not exist (or no longer does).
    #[error("no document '{id}' in collection '{collection}'")]
    NotFound { collection: Collection, id: RecordId },

    #[error("filesystem watcher error: {0}")]
    Watch(#[from] notify::Error),

    /// Operation needs an on-disk store but this one is memory-only.
    #[error("store has no backing directory")]
    NotPersistent,

    /// The backend refused or could not serve the request.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Convenience constructor for [`StoreError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.into(),
        source,
    }
}
