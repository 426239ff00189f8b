pub mod file_repository;
#[cfg(test)]
pub mod memory_repository;
pub mod repository;

use std::io;
use std::path::PathBuf;

/// Failures reading or writing a persisted collection.
///
/// An unparseable file is not an error: the file store logs
/// it and hands back an empty collection.
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("failed to {action} {}: {source}", path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to serialize collection: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl StoreError {
    pub(crate) fn io(action: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        StoreError::Io {
            action,
            path: path.into(),
            source,
        }
    }
}
