//! Playback orchestration
//!
//! Turns "play track X" into "a committed local file is loaded in the
//! engine". Every `play` call starts a new attempt and supersedes the one
//! before it:
//!
//! ```text
//! play(X) ──► Pending ──► ensure cached ──► Completed (engine.open)
//!                 │              │
//!                 │              └──────► Rejected (logged, engine stays stopped)
//!                 └─ newer play ───────► Superseded (silent)
//! ```
//!
//! Attempts are tagged with a generation number. Only the attempt whose
//! generation is still current may touch the engine or publish a terminal
//! status.

use crate::error::{PlaybackError, Result};
use crate::fetch::{store_stream, until_cancelled};
use crate::keys;
use crate::locks::KeyedLocks;
use crate::queue;
use crate::types::{PlaybackConfig, PlaybackSnapshot};
use cadence_cache::ContentCache;
use cadence_core::{
    Catalog, DirectLink, NotificationBus, OperationStatus, PlaybackEngine, RemoteFetcher,
    Subscription, TrackId,
};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

struct State {
    queue: Arc<[TrackId]>,
    current: Option<TrackId>,
    status: OperationStatus,
    generation: u64,
    token: Option<CancellationToken>,
}

impl State {
    fn snapshot(&self) -> PlaybackSnapshot {
        PlaybackSnapshot {
            track_id: self.current.clone(),
            status: self.status,
        }
    }
}

struct Inner {
    catalog: Arc<dyn Catalog>,
    engine: Arc<dyn PlaybackEngine>,
    fetcher: Arc<dyn RemoteFetcher>,
    cache: Arc<ContentCache>,
    locks: KeyedLocks,
    config: PlaybackConfig,
    state: Mutex<State>,
    changed: NotificationBus<PlaybackSnapshot>,
}

/// Sequences "resolve → cache → engine" for the current track and owns the
/// play queue
///
/// Cloning is cheap; clones drive the same player.
#[derive(Clone)]
pub struct PlaybackOrchestrator {
    inner: Arc<Inner>,
}

impl PlaybackOrchestrator {
    pub fn new(
        catalog: Arc<dyn Catalog>,
        engine: Arc<dyn PlaybackEngine>,
        fetcher: Arc<dyn RemoteFetcher>,
        cache: Arc<ContentCache>,
        config: PlaybackConfig,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                catalog,
                engine,
                fetcher,
                cache,
                locks: KeyedLocks::new(),
                config,
                state: Mutex::new(State {
                    queue: Arc::from(Vec::new()),
                    current: None,
                    status: OperationStatus::Empty,
                    generation: 0,
                    token: None,
                }),
                changed: NotificationBus::new(),
            }),
        }
    }

    /// Start playing `track_id`, superseding any attempt in flight
    ///
    /// Current audio stops before this returns, unless a concurrent newer
    /// `play` has already taken over. The returned handle resolves
    /// once the attempt has settled; dropping it does not cancel anything.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn play(&self, track_id: TrackId) -> JoinHandle<()> {
        let (generation, token, snapshot) = {
            let mut state = self.inner.lock();
            if let Some(previous) = state.token.take() {
                previous.cancel();
            }

            let token = CancellationToken::new();
            state.generation += 1;
            state.current = Some(track_id.clone());
            state.status = OperationStatus::Pending;
            state.token = Some(token.clone());
            (state.generation, token, state.snapshot())
        };

        info!(track_id = %track_id, generation, "Playback requested");
        self.inner.notify(&snapshot);
        self.inner.stop_if_current(generation);

        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move { inner.run(track_id, generation, token).await })
    }

    /// Play the track `offset` positions away in the queue
    ///
    /// No-op (returns `None`) when the current track is not in the queue or
    /// the target index is out of bounds.
    pub fn move_by(&self, offset: isize) -> Option<JoinHandle<()>> {
        let target = {
            let state = self.inner.lock();
            queue::shifted(&state.queue, state.current.as_ref(), offset)?.clone()
        };
        Some(self.play(target))
    }

    /// Whether [`move_by`](Self::move_by) with `offset` would play something
    pub fn can_move(&self, offset: isize) -> bool {
        let state = self.inner.lock();
        queue::shifted(&state.queue, state.current.as_ref(), offset).is_some()
    }

    pub fn next(&self) -> Option<JoinHandle<()>> {
        self.move_by(1)
    }

    pub fn previous(&self) -> Option<JoinHandle<()>> {
        self.move_by(-1)
    }

    /// Replace the active queue
    ///
    /// The current track and any attempt in flight are left alone.
    pub fn set_queue(&self, tracks: Arc<[TrackId]>) {
        debug!(len = tracks.len(), "Queue replaced");
        self.inner.lock().queue = tracks;
    }

    pub fn queue(&self) -> Arc<[TrackId]> {
        Arc::clone(&self.inner.lock().queue)
    }

    /// Current track and status
    pub fn current(&self) -> PlaybackSnapshot {
        self.inner.lock().snapshot()
    }

    /// Get notified of every `Pending` and terminal transition
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&PlaybackSnapshot) + Send + Sync + 'static,
    {
        self.inner.changed.subscribe(callback)
    }

    pub fn set_paused(&self, paused: bool) {
        self.inner.engine.set_paused(paused);
    }

    /// Flip pause state; returns the new state, or `None` when nothing is loaded
    pub fn toggle_paused(&self) -> Option<bool> {
        let paused = !self.inner.engine.is_paused()?;
        self.inner.engine.set_paused(paused);
        Some(paused)
    }

    /// Seek to a normalized position, clamped to 0.0 - 1.0
    pub fn seek(&self, position: f32) {
        self.inner.engine.set_position(position.clamp(0.0, 1.0));
    }

    /// Set output volume, clamped to 0.0 - 1.0
    pub fn set_volume(&self, volume: f32) {
        self.inner.engine.set_volume(volume.clamp(0.0, 1.0));
    }

    pub fn cache(&self) -> &Arc<ContentCache> {
        &self.inner.cache
    }

    pub fn config(&self) -> &PlaybackConfig {
        &self.inner.config
    }
}

impl Inner {
    async fn run(&self, track_id: TrackId, generation: u64, token: CancellationToken) {
        match self.ensure_audio(&track_id, &token).await {
            Ok(path) => self.complete(&track_id, generation, &path),
            Err(err) if err.is_cancelled() => {
                debug!(track_id = %track_id, generation, "Playback superseded");
            }
            Err(err) => self.reject(&track_id, generation, &err),
        }
    }

    /// Local path of the committed audio blob, downloading it on a miss
    async fn ensure_audio(&self, track_id: &TrackId, token: &CancellationToken) -> Result<PathBuf> {
        let key = keys::audio_key(&self.config.source, track_id);
        if let Ok(path) = self.cache.path_of(&key) {
            debug!(track_id = %track_id, "Audio cache hit");
            return Ok(path);
        }

        let _guard = until_cancelled(token, self.locks.acquire(&key)).await?;

        // Another download of the same track may have finished while we waited
        if let Ok(path) = self.cache.path_of(&key) {
            debug!(track_id = %track_id, "Audio cached by concurrent download");
            return Ok(path);
        }

        let links = until_cancelled(token, self.catalog.resolve_direct_links(track_id)).await??;
        let link = DirectLink::best(&links)
            .ok_or_else(|| PlaybackError::NoDirectLinks(track_id.to_string()))?;
        info!(track_id = %track_id, bitrate_kbps = link.bitrate_kbps, "Downloading audio");

        let body = until_cancelled(token, self.fetcher.open(&link.url)).await??;
        store_stream(&self.cache, &key, body, token).await
    }

    fn complete(&self, track_id: &TrackId, generation: u64, path: &Path) {
        let snapshot = {
            let mut state = self.lock();
            if state.generation != generation {
                debug!(track_id = %track_id, generation, "Discarding superseded result");
                return;
            }

            // Opened under the lock so a newer play() cannot slip in between
            match self.engine.open(path) {
                Ok(()) => {
                    info!(track_id = %track_id, path = %path.display(), "Playback started");
                    state.status = OperationStatus::Completed;
                }
                Err(err) => {
                    warn!(track_id = %track_id, error = %err, "Engine refused track");
                    state.status = OperationStatus::Rejected;
                }
            }
            state.token = None;
            state.snapshot()
        };
        self.notify(&snapshot);
    }

    /// Stop the engine unless a newer `play` has already taken over
    ///
    /// Checked under the state lock, the same lock `complete` opens under.
    fn stop_if_current(&self, generation: u64) {
        let state = self.lock();
        if state.generation == generation {
            self.engine.stop();
        } else {
            debug!(generation, "Skipping stop of superseded attempt");
        }
    }

    fn reject(&self, track_id: &TrackId, generation: u64, err: &PlaybackError) {
        let snapshot = {
            let mut state = self.lock();
            if state.generation != generation {
                debug!(track_id = %track_id, error = %err, "Superseded attempt failed");
                return;
            }
            state.status = OperationStatus::Rejected;
            state.token = None;
            state.snapshot()
        };

        warn!(track_id = %track_id, error = %err, "Playback rejected");
        self.notify(&snapshot);
    }

    fn notify(&self, snapshot: &PlaybackSnapshot) {
        if let Err(err) = self.changed.emit(snapshot) {
            debug!(error = %err, "Playback listeners reported failures");
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().expect("playback state poisoned")
    }
}
