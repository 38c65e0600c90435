//! Playback engine status types
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Coarse state reported by the playback engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerState {
    /// Audio is playing
    Playing,
    /// Paused mid-track
    Paused,
    /// Finished, stopped or failed
    Ended,
}

/// Snapshot of the playback engine, as returned by `PlaybackEngine::status`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerStatus {
    /// Current engine state
    pub state: PlayerState,

    /// Normalized position in the track (0.0 - 1.0)
    pub position: f32,

    /// Total track length
    pub length: Duration,

    /// Output volume (0.0 - 1.0)
    pub volume: f32,
}
