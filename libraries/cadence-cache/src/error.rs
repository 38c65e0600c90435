//! Error types for the content cache

use std::path::Path;
use thiserror::Error;

/// Content cache errors
#[derive(Debug, Error)]
pub enum CacheError {
    /// No committed entry for the logical id
    #[error("Cache entry not found: {0}")]
    NotFound(String),

    /// Disk write, rename or unlink failed
    #[error("Storage I/O error on {path}: {source}")]
    StorageIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Manifest could not be parsed or has an unsupported version
    #[error("Manifest error: {0}")]
    Manifest(String),

    /// `commit` was called before the blob was written
    #[error("Backing file missing for {0}")]
    MissingBlob(String),
}

impl CacheError {
    pub(crate) fn io(path: &Path) -> impl FnOnce(std::io::Error) -> Self + '_ {
        move |source| Self::StorageIo {
            path: path.display().to_string(),
            source,
        }
    }
}

/// Result type for cache operations
pub type Result<T> = std::result::Result<T, CacheError>;
