//! Playlists and track lists loaded from the catalog
//!
//! Every list is an [`AsyncValue`]: it starts `Empty`, becomes `Pending`
//! while the catalog is queried and settles on `Completed` or `Rejected`.
//! Subscribers are notified on each transition.

use crate::error::Result;
use crate::orchestrator::PlaybackOrchestrator;
use cadence_core::{
    AsyncValue, Catalog, OperationStatus, PlaylistId, PlaylistSummary, Subscription, TrackId,
    TrackMetadata,
};
use futures_util::future::try_join_all;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

/// Display title of the synthetic liked-tracks playlist
pub const LIKED_TITLE: &str = "Liked";

/// One playlist and its (lazily loaded) track list
pub struct Playlist {
    summary: PlaylistSummary,
    tracks: AsyncValue<Arc<[TrackId]>>,
}

impl Playlist {
    fn new(summary: PlaylistSummary) -> Self {
        Self {
            summary,
            tracks: AsyncValue::new(),
        }
    }

    pub fn id(&self) -> &PlaylistId {
        &self.summary.id
    }

    pub fn title(&self) -> &str {
        &self.summary.title
    }

    /// Loaded track ids, if any
    pub fn tracks(&self) -> Option<Arc<[TrackId]>> {
        self.tracks.value()
    }

    pub fn status(&self) -> OperationStatus {
        self.tracks.status()
    }

    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&OperationStatus) + Send + Sync + 'static,
    {
        self.tracks.subscribe(callback)
    }
}

/// The user's playlists and the metadata of every loaded track
pub struct Library {
    catalog: Arc<dyn Catalog>,
    playlists: AsyncValue<Vec<Arc<Playlist>>>,
    tracks: Mutex<HashMap<TrackId, TrackMetadata>>,
}

impl Library {
    pub fn new(catalog: Arc<dyn Catalog>) -> Self {
        Self {
            catalog,
            playlists: AsyncValue::new(),
            tracks: Mutex::new(HashMap::new()),
        }
    }

    /// Fetch the playlist list; the liked playlist always comes first
    pub async fn load_playlists(&self) -> Result<()> {
        self.playlists.begin();

        let remote = match self.catalog.fetch_playlists().await {
            Ok(remote) => remote,
            Err(err) => {
                warn!(error = %err, "Failed to load playlists");
                self.playlists.reject();
                return Err(err.into());
            }
        };

        let liked = PlaylistSummary {
            id: PlaylistId::liked(),
            title: LIKED_TITLE.to_string(),
        };
        let playlists: Vec<Arc<Playlist>> = std::iter::once(liked)
            .chain(remote.into_iter().filter(|p| !p.id.is_liked()))
            .map(|summary| Arc::new(Playlist::new(summary)))
            .collect();

        info!(count = playlists.len(), "Playlists loaded");
        self.playlists.complete(playlists);
        Ok(())
    }

    /// Loaded playlists, liked first
    pub fn playlists(&self) -> Option<Vec<Arc<Playlist>>> {
        self.playlists.value()
    }

    pub fn playlists_status(&self) -> OperationStatus {
        self.playlists.status()
    }

    pub fn subscribe_playlists<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&OperationStatus) + Send + Sync + 'static,
    {
        self.playlists.subscribe(callback)
    }

    /// Look up a loaded playlist
    pub fn playlist(&self, id: &PlaylistId) -> Option<Arc<Playlist>> {
        self.playlists()?.into_iter().find(|p| p.id() == id)
    }

    /// Fetch the track ids of `playlist` and the metadata of each track
    pub async fn load_tracks(&self, playlist: &Playlist) -> Result<()> {
        playlist.tracks.begin();

        match self.fetch_tracks(playlist.id()).await {
            Ok(metadata) => {
                let ids: Arc<[TrackId]> = metadata.iter().map(|m| m.id.clone()).collect();
                self.tracks
                    .lock()
                    .expect("track table poisoned")
                    .extend(metadata.into_iter().map(|m| (m.id.clone(), m)));

                info!(playlist = %playlist.id(), count = ids.len(), "Tracks loaded");
                playlist.tracks.complete(ids);
                Ok(())
            }
            Err(err) => {
                warn!(playlist = %playlist.id(), error = %err, "Failed to load tracks");
                playlist.tracks.reject();
                Err(err.into())
            }
        }
    }

    /// Metadata of a track loaded through any playlist
    pub fn track(&self, id: &TrackId) -> Option<TrackMetadata> {
        self.tracks.lock().expect("track table poisoned").get(id).cloned()
    }

    /// Make the loaded track list of `playlist` the orchestrator's queue
    ///
    /// Returns `false` when the tracks have not been loaded yet.
    pub fn activate(&self, playlist: &Playlist, orchestrator: &PlaybackOrchestrator) -> bool {
        let Some(tracks) = playlist.tracks() else {
            return false;
        };
        orchestrator.set_queue(tracks);
        true
    }

    async fn fetch_tracks(&self, id: &PlaylistId) -> cadence_core::Result<Vec<TrackMetadata>> {
        let ids = if id.is_liked() {
            self.catalog.fetch_liked_track_ids().await?
        } else {
            self.catalog.fetch_playlist_track_ids(id).await?
        };

        try_join_all(ids.iter().map(|track_id| self.catalog.fetch_metadata(track_id))).await
    }
}
