//! Cadence Playback
//!
//! Everything between a user intent and the audio engine:
//!
//! - [`PlaybackOrchestrator`]: "play track X", queue navigation and
//!   supersession of stale attempts
//! - [`CoverStore`]: cover art fetched through the content cache
//! - [`Library`]: playlists and track lists with an [`OperationStatus`](cadence_core::OperationStatus)
//! - [`StatusPoller`]: periodic engine status broadcast
//! - [`HttpFetcher`]: `reqwest`-backed [`RemoteFetcher`](cadence_core::RemoteFetcher)
//!
//! Collaborators (catalog, engine, fetcher) and the cache are injected as
//! `Arc`s by the host application.

pub mod covers;
pub mod error;
pub mod fetch;
pub mod keys;
pub mod library;
mod locks;
pub mod orchestrator;
pub mod poller;
mod queue;
pub mod types;

pub use covers::CoverStore;
pub use error::{PlaybackError, Result};
pub use fetch::{store_stream, HttpFetcher};
pub use library::{Library, Playlist, LIKED_TITLE};
pub use orchestrator::PlaybackOrchestrator;
pub use poller::StatusPoller;
pub use types::{PlaybackConfig, PlaybackSnapshot};
