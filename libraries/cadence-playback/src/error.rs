//! Error types for playback orchestration

use cadence_cache::CacheError;
use cadence_core::CoreError;
use thiserror::Error;

/// Playback errors
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// Cache mutation or lookup failed
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    /// Catalog, engine or fetcher reported a failure
    #[error(transparent)]
    Collaborator(#[from] CoreError),

    /// Remote transfer failed
    #[error("Network error: {0}")]
    Network(String),

    /// Writing a downloaded blob failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The catalog offered no direct link for the track
    #[error("No direct links for track {0}")]
    NoDirectLinks(String),

    /// Superseded by a newer request
    #[error("Cancelled")]
    Cancelled,
}

impl PlaybackError {
    /// Whether this is a supersession rather than a failure
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
