//! Shared test collaborators
//!
//! Hand-written mocks for the catalog, the engine and the remote fetcher.
//! Each records what it was asked to do so tests can assert on ordering.

#![allow(dead_code)]

use async_trait::async_trait;
use bytes::Bytes;
use cadence_cache::ContentCache;
use cadence_core::{
    ByteStream, Catalog, CoreError, DirectLink, PlaybackEngine, PlayerState, PlayerStatus,
    PlaylistId, PlaylistSummary, RemoteFetcher, Result, TrackId, TrackMetadata,
};
use cadence_playback::{PlaybackConfig, PlaybackOrchestrator, PlaybackSnapshot};
use futures_util::stream::{self, StreamExt};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::Semaphore;

// ============================================================================
// Catalog
// ============================================================================

#[derive(Default)]
pub struct MockCatalog {
    links: HashMap<TrackId, Vec<DirectLink>>,
    metadata: HashMap<TrackId, TrackMetadata>,
    covers: HashMap<TrackId, Vec<u8>>,
    liked: Vec<TrackId>,
    playlists: Vec<PlaylistSummary>,
    playlist_tracks: HashMap<PlaylistId, Vec<TrackId>>,
    fail_playlists: bool,
    pub resolve_calls: AtomicUsize,
    pub cover_calls: AtomicUsize,
}

impl MockCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_links(mut self, track: &str, links: Vec<DirectLink>) -> Self {
        self.links.insert(TrackId::from(track), links);
        self
    }

    /// Single 320 kbps link at `url`
    pub fn with_track(self, track: &str, url: &str) -> Self {
        self.with_links(track, vec![DirectLink::new(320, url)])
    }

    pub fn with_metadata(mut self, track: &str, title: &str) -> Self {
        self.metadata
            .insert(TrackId::from(track), TrackMetadata::new(track, title));
        self
    }

    pub fn with_cover(mut self, track: &str, bytes: &[u8]) -> Self {
        self.covers.insert(TrackId::from(track), bytes.to_vec());
        self
    }

    pub fn with_liked(mut self, tracks: &[&str]) -> Self {
        self.liked = tracks.iter().map(|t| TrackId::from(*t)).collect();
        self
    }

    pub fn with_playlist(mut self, id: &str, title: &str, tracks: &[&str]) -> Self {
        self.playlists.push(PlaylistSummary {
            id: PlaylistId::from(id),
            title: title.to_string(),
        });
        self.playlist_tracks.insert(
            PlaylistId::from(id),
            tracks.iter().map(|t| TrackId::from(*t)).collect(),
        );
        self
    }

    pub fn failing_playlists(mut self) -> Self {
        self.fail_playlists = true;
        self
    }
}

#[async_trait]
impl Catalog for MockCatalog {
    async fn resolve_direct_links(&self, track_id: &TrackId) -> Result<Vec<DirectLink>> {
        self.resolve_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.links.get(track_id).cloned().unwrap_or_default())
    }

    async fn fetch_metadata(&self, track_id: &TrackId) -> Result<TrackMetadata> {
        self.metadata
            .get(track_id)
            .cloned()
            .ok_or_else(|| CoreError::catalog(format!("unknown track {}", track_id)))
    }

    async fn fetch_liked_track_ids(&self) -> Result<Vec<TrackId>> {
        Ok(self.liked.clone())
    }

    async fn fetch_cover(&self, track_id: &TrackId, _size: &str) -> Result<Option<ByteStream>> {
        self.cover_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .covers
            .get(track_id)
            .map(|bytes| body(vec![Bytes::from(bytes.clone())])))
    }

    async fn fetch_playlists(&self) -> Result<Vec<PlaylistSummary>> {
        if self.fail_playlists {
            return Err(CoreError::catalog("playlists unavailable"));
        }
        Ok(self.playlists.clone())
    }

    async fn fetch_playlist_track_ids(&self, playlist_id: &PlaylistId) -> Result<Vec<TrackId>> {
        self.playlist_tracks
            .get(playlist_id)
            .cloned()
            .ok_or_else(|| CoreError::catalog(format!("unknown playlist {}", playlist_id)))
    }
}

// ============================================================================
// Engine
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum EngineCall {
    Open(PathBuf),
    Stop,
}

#[derive(Default)]
pub struct MockEngine {
    calls: Mutex<Vec<EngineCall>>,
    loaded: Mutex<Option<PathBuf>>,
    paused: Mutex<bool>,
    position: Mutex<f32>,
    volume: Mutex<f32>,
    fail_open: bool,
}

impl MockEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_open() -> Self {
        Self {
            fail_open: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<EngineCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn opened(&self) -> Vec<PathBuf> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                EngineCall::Open(path) => Some(path),
                EngineCall::Stop => None,
            })
            .collect()
    }

    pub fn position(&self) -> f32 {
        *self.position.lock().unwrap()
    }

    pub fn volume(&self) -> f32 {
        *self.volume.lock().unwrap()
    }
}

impl PlaybackEngine for MockEngine {
    fn open(&self, path: &Path) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push(EngineCall::Open(path.to_path_buf()));
        if self.fail_open {
            return Err(CoreError::engine("unsupported format"));
        }
        *self.loaded.lock().unwrap() = Some(path.to_path_buf());
        *self.paused.lock().unwrap() = false;
        Ok(())
    }

    fn stop(&self) {
        self.calls.lock().unwrap().push(EngineCall::Stop);
        *self.loaded.lock().unwrap() = None;
    }

    fn status(&self) -> Option<PlayerStatus> {
        self.loaded.lock().unwrap().as_ref()?;
        let state = if *self.paused.lock().unwrap() {
            PlayerState::Paused
        } else {
            PlayerState::Playing
        };
        Some(PlayerStatus {
            state,
            position: self.position(),
            length: Duration::from_secs(180),
            volume: self.volume(),
        })
    }

    fn is_paused(&self) -> Option<bool> {
        self.loaded.lock().unwrap().as_ref()?;
        Some(*self.paused.lock().unwrap())
    }

    fn set_paused(&self, paused: bool) {
        *self.paused.lock().unwrap() = paused;
    }

    fn set_position(&self, position: f32) {
        *self.position.lock().unwrap() = position;
    }

    fn set_volume(&self, volume: f32) {
        *self.volume.lock().unwrap() = volume;
    }
}

// ============================================================================
// Fetcher
// ============================================================================

/// Serves fixed bodies per URL; gated URLs block until released
#[derive(Default)]
pub struct GatedFetcher {
    bodies: HashMap<String, Vec<u8>>,
    gates: HashMap<String, Arc<Semaphore>>,
    tail_gates: HashMap<String, Arc<Semaphore>>,
    failing: HashSet<String>,
    opened: Mutex<Vec<String>>,
}

impl GatedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn serve(mut self, url: &str, bytes: &[u8]) -> Self {
        self.bodies.insert(url.to_string(), bytes.to_vec());
        self
    }

    /// Serve `url`, but hold `open` until [`release`](Self::release)
    pub fn serve_gated(mut self, url: &str, bytes: &[u8]) -> Self {
        self.gates
            .insert(url.to_string(), Arc::new(Semaphore::new(0)));
        self.serve(url, bytes)
    }

    /// Serve `url`, but stall after the first chunk until
    /// [`release_rest`](Self::release_rest)
    pub fn serve_stalling(mut self, url: &str, bytes: &[u8]) -> Self {
        self.tail_gates
            .insert(url.to_string(), Arc::new(Semaphore::new(0)));
        self.serve(url, bytes)
    }

    pub fn failing(mut self, url: &str) -> Self {
        self.failing.insert(url.to_string());
        self
    }

    pub fn release(&self, url: &str) {
        if let Some(gate) = self.gates.get(url) {
            gate.add_permits(1);
        }
    }

    pub fn release_rest(&self, url: &str) {
        if let Some(gate) = self.tail_gates.get(url) {
            gate.add_permits(1);
        }
    }

    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().unwrap().clone()
    }
}

#[async_trait]
impl RemoteFetcher for GatedFetcher {
    async fn open(&self, url: &str) -> Result<ByteStream> {
        self.opened.lock().unwrap().push(url.to_string());

        if let Some(gate) = self.gates.get(url) {
            let _permit = gate
                .acquire()
                .await
                .map_err(|_| CoreError::network("gate closed"))?;
        }

        if self.failing.contains(url) {
            return Err(CoreError::network(format!("{} unreachable", url)));
        }

        let bytes = self
            .bodies
            .get(url)
            .cloned()
            .ok_or_else(|| CoreError::network(format!("404 for {}", url)))?;

        // Two chunks so the writer loop runs more than once
        let mid = bytes.len() / 2;
        let head = Bytes::copy_from_slice(&bytes[..mid]);
        let tail = Bytes::copy_from_slice(&bytes[mid..]);

        let Some(gate) = self.tail_gates.get(url).cloned() else {
            return Ok(body(vec![head, tail]));
        };
        let stalled_tail = stream::once(async move {
            gate.acquire()
                .await
                .map_err(|_| CoreError::network("gate closed"))?
                .forget();
            Ok::<Bytes, CoreError>(tail)
        });
        Ok(stream::once(async move { Ok::<Bytes, CoreError>(head) })
            .chain(stalled_tail)
            .boxed())
    }
}

pub fn body(chunks: Vec<Bytes>) -> ByteStream {
    stream::iter(chunks.into_iter().map(Ok)).boxed()
}

// ============================================================================
// Harness
// ============================================================================

pub struct Harness {
    pub dir: TempDir,
    pub cache: Arc<ContentCache>,
    pub catalog: Arc<MockCatalog>,
    pub engine: Arc<MockEngine>,
    pub fetcher: Arc<GatedFetcher>,
    pub orchestrator: PlaybackOrchestrator,
}

impl Harness {
    pub fn new(catalog: MockCatalog, engine: MockEngine, fetcher: GatedFetcher) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let cache = Arc::new(ContentCache::open(dir.path()).expect("Failed to open cache"));
        let catalog = Arc::new(catalog);
        let engine = Arc::new(engine);
        let fetcher = Arc::new(fetcher);

        let orchestrator = PlaybackOrchestrator::new(
            catalog.clone(),
            engine.clone(),
            fetcher.clone(),
            Arc::clone(&cache),
            PlaybackConfig::default(),
        );

        Self {
            dir,
            cache,
            catalog,
            engine,
            fetcher,
            orchestrator,
        }
    }

    /// Put a committed audio blob for `track` into the cache
    pub fn precache(&self, track: &str, bytes: &[u8]) -> PathBuf {
        let key = format!("remote/track/{}/audio", track);
        let target = self.cache.begin(&key).unwrap();
        std::fs::write(&target, bytes).unwrap();
        self.cache.commit(&key).unwrap();
        target
    }
}

/// Collects every playback notification
pub fn record(
    orchestrator: &PlaybackOrchestrator,
) -> (Arc<Mutex<Vec<PlaybackSnapshot>>>, cadence_core::Subscription) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let subscription =
        orchestrator.subscribe(move |snapshot| sink.lock().unwrap().push(snapshot.clone()));
    (seen, subscription)
}

pub fn snapshot(track: &str, status: cadence_core::OperationStatus) -> PlaybackSnapshot {
    PlaybackSnapshot {
        track_id: Some(TrackId::from(track)),
        status,
    }
}
