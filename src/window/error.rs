use std::num::ParseIntError;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed timestamp {content:?} at {}:{line}", path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        content: String,
        #[source]
        source: ParseIntError,
    },
}

impl PersistenceError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PersistenceError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Failure of one step of the service protocol
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("failed to load timestamps: {0}")]
    Load(#[source] PersistenceError),

    #[error("failed to sync timestamps: {0}")]
    Sync(#[source] PersistenceError),
}

pub type Result<T> = std::result::Result<T, PersistenceError>;
