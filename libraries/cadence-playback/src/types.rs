//! Playback configuration and notification payloads

use cadence_core::{OperationStatus, TrackId};
use std::time::Duration;

/// Library-facing playback settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackConfig {
    /// Prefix of every logical cache id (`"<source>/track/<id>/audio"`)
    pub source: String,

    /// Catalog size token requested for cover art
    pub cover_size: String,

    /// How often the engine status is polled
    pub status_poll_interval: Duration,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            source: "remote".to_string(),
            cover_size: "100x100".to_string(),
            status_poll_interval: Duration::from_millis(100),
        }
    }
}

/// What the orchestrator publishes on every state change
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PlaybackSnapshot {
    /// Track the current attempt is about, `None` before the first `play`
    pub track_id: Option<TrackId>,

    /// Status of the current attempt
    pub status: OperationStatus,
}
