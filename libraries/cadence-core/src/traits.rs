//! Collaborator traits for Cadence
//!
//! The catalog, the remote byte source and the audio engine live outside the
//! core. The cache and the playback orchestrator only talk to them through
//! these traits.
use crate::error::Result;
use crate::types::{DirectLink, PlayerStatus, PlaylistId, PlaylistSummary, TrackId, TrackMetadata};
use async_trait::async_trait;
use bytes::Bytes;
use futures_util::stream::BoxStream;
use std::path::Path;

/// A stream of byte chunks from a remote resource
pub type ByteStream = BoxStream<'static, Result<Bytes>>;

/// Remote music catalog
///
/// Failures are opaque to the core: any error simply means "it failed".
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Resolve time-limited direct download links, one per available encoding
    async fn resolve_direct_links(&self, track_id: &TrackId) -> Result<Vec<DirectLink>>;

    /// Fetch metadata for a single track
    async fn fetch_metadata(&self, track_id: &TrackId) -> Result<TrackMetadata>;

    /// Fetch the ids of the user's liked tracks
    async fn fetch_liked_track_ids(&self) -> Result<Vec<TrackId>>;

    /// Fetch cover art for a track
    ///
    /// `size` is a catalog-specific size token such as `"100x100"`.
    /// Returns `None` when the track has no cover.
    async fn fetch_cover(&self, track_id: &TrackId, size: &str) -> Result<Option<ByteStream>>;

    /// List the user's playlists
    async fn fetch_playlists(&self) -> Result<Vec<PlaylistSummary>>;

    /// Fetch the track ids of one playlist
    async fn fetch_playlist_track_ids(&self, playlist_id: &PlaylistId) -> Result<Vec<TrackId>>;
}

/// Source of remote bytes for direct links
#[async_trait]
pub trait RemoteFetcher: Send + Sync {
    /// Open `url` and stream its body
    async fn open(&self, url: &str) -> Result<ByteStream>;
}

/// Native audio playback engine
///
/// Implementers own the decoder and output device. All methods are expected to
/// return quickly; the orchestrator calls them from async context.
pub trait PlaybackEngine: Send + Sync {
    /// Start playing a local file, replacing whatever was loaded
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened
    fn open(&self, path: &Path) -> Result<()>;

    /// Stop playback and unload the current file
    fn stop(&self);

    /// Current engine status, or `None` when nothing is loaded
    fn status(&self) -> Option<PlayerStatus>;

    /// Whether playback is paused, or `None` when nothing is loaded
    fn is_paused(&self) -> Option<bool>;

    /// Pause or resume
    fn set_paused(&self, paused: bool);

    /// Seek to a normalized position (0.0 - 1.0)
    fn set_position(&self, position: f32);

    /// Set output volume (0.0 - 1.0)
    fn set_volume(&self, volume: f32);
}
