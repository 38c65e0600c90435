//! Cover art through the content cache

use crate::error::Result;
use crate::fetch::store_stream;
use crate::keys;
use crate::locks::KeyedLocks;
use crate::types::PlaybackConfig;
use cadence_cache::ContentCache;
use cadence_core::{Catalog, TrackId, TrackMetadata};
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Fetches cover art on demand and keeps it in the cache
///
/// Concurrent requests for the same cover share one download.
pub struct CoverStore {
    catalog: Arc<dyn Catalog>,
    cache: Arc<ContentCache>,
    locks: KeyedLocks,
    source: String,
    size: String,
}

impl CoverStore {
    /// `source` prefixes the logical ids, `size` is the catalog size token
    pub fn new(
        catalog: Arc<dyn Catalog>,
        cache: Arc<ContentCache>,
        source: impl Into<String>,
        size: impl Into<String>,
    ) -> Self {
        Self {
            catalog,
            cache,
            locks: KeyedLocks::new(),
            source: source.into(),
            size: size.into(),
        }
    }

    /// Cover store using the source prefix and size token of `config`
    pub fn from_config(
        catalog: Arc<dyn Catalog>,
        cache: Arc<ContentCache>,
        config: &PlaybackConfig,
    ) -> Self {
        Self::new(catalog, cache, &config.source, &config.cover_size)
    }

    /// Local path of the cover for `track_id`
    ///
    /// `None` when the catalog has no cover for the track.
    pub async fn cover_path(&self, track_id: &TrackId) -> Result<Option<PathBuf>> {
        let key = keys::cover_key(&self.source, track_id);
        if let Ok(path) = self.cache.path_of(&key) {
            return Ok(Some(path));
        }

        let _guard = self.locks.acquire(&key).await;
        if let Ok(path) = self.cache.path_of(&key) {
            return Ok(Some(path));
        }

        let Some(body) = self.catalog.fetch_cover(track_id, &self.size).await? else {
            debug!(track_id = %track_id, "Track has no cover");
            return Ok(None);
        };

        // Cover downloads are never superseded
        let token = CancellationToken::new();
        store_stream(&self.cache, &key, body, &token).await.map(Some)
    }

    /// Like [`cover_path`](Self::cover_path), but trusts `track.has_cover`
    ///
    /// Tracks the catalog marks as coverless resolve to `None` without a
    /// catalog round trip.
    pub async fn cover_of(&self, track: &TrackMetadata) -> Result<Option<PathBuf>> {
        if !track.has_cover {
            return Ok(None);
        }
        self.cover_path(&track.id).await
    }
}
