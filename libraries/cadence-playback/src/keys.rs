//! Logical cache ids
//!
//! Audio and cover art for the same track live under different suffixes so
//! they never collide in the cache.

use cadence_core::TrackId;

/// `"<source>/track/<id>/audio"`
pub fn audio_key(source: &str, track_id: &TrackId) -> String {
    format!("{}/track/{}/audio", source, track_id)
}

/// `"<source>/track/<id>/cover"`
pub fn cover_key(source: &str, track_id: &TrackId) -> String {
    format!("{}/track/{}/cover", source, track_id)
}
