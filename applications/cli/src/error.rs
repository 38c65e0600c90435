//! CLI error types

use cadence_cache::CacheError;
use cadence_playback::PlaybackError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error(transparent)]
    Playback(#[from] PlaybackError),

    #[error(transparent)]
    Collaborator(#[from] cadence_core::CoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CliError>;
