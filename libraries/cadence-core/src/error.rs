//! Core error types for Cadence
use thiserror::Error;

/// Result type alias using `CoreError`
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors raised by external collaborators (catalog, engine, remote fetcher)
///
/// The core treats these as opaque: it only needs to know that an operation failed.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Remote catalog request failed
    #[error("Catalog error: {0}")]
    Catalog(String),

    /// Playback engine rejected an operation
    #[error("Engine error: {0}")]
    Engine(String),

    /// Remote byte transfer failed
    #[error("Network error: {0}")]
    Network(String),

    /// I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CoreError {
    /// Create a catalog error
    pub fn catalog(msg: impl Into<String>) -> Self {
        Self::Catalog(msg.into())
    }

    /// Create an engine error
    pub fn engine(msg: impl Into<String>) -> Self {
        Self::Engine(msg.into())
    }

    /// Create a network error
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }
}
