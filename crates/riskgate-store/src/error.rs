//! Error types for the store crate.

use crate::schema::MigrationError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or persisting the decision store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The persisted state is unreadable or written by an incompatible version.
    #[error("schema error in {path}: {source}")]
    Schema {
        path: PathBuf,
        #[source]
        source: MigrationError,
    },

    /// Filesystem failure while reading, writing or locking.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
