//! Catalog-facing track and playlist types
use super::{PlaylistId, TrackId};
use serde::{Deserialize, Serialize};

/// Track metadata as supplied by the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackMetadata {
    pub id: TrackId,
    pub title: String,

    /// `(artist id, artist name)` pairs
    #[serde(default)]
    pub artists: Vec<(String, String)>,

    /// `(album id, album title)` pairs
    #[serde(default)]
    pub albums: Vec<(String, String)>,

    /// Whether the catalog has cover art for this track
    #[serde(default)]
    pub has_cover: bool,
}

impl TrackMetadata {
    /// Create metadata with only a title
    pub fn new(id: impl Into<TrackId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            artists: Vec::new(),
            albums: Vec::new(),
            has_cover: false,
        }
    }

    /// Artist names joined for display
    pub fn artist_line(&self) -> String {
        self.artists
            .iter()
            .map(|(_, name)| name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Playlist header as listed by the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistSummary {
    pub id: PlaylistId,
    pub title: String,
}

/// A time-limited direct download link for one encoding of a track
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectLink {
    pub bitrate_kbps: u32,
    pub url: String,
}

impl DirectLink {
    pub fn new(bitrate_kbps: u32, url: impl Into<String>) -> Self {
        Self {
            bitrate_kbps,
            url: url.into(),
        }
    }

    /// Pick the highest-bitrate link
    ///
    /// Ties go to the first link encountered at the maximum bitrate.
    pub fn best(links: &[DirectLink]) -> Option<&DirectLink> {
        links.iter().fold(None, |best: Option<&DirectLink>, link| match best {
            Some(current) if current.bitrate_kbps >= link.bitrate_kbps => Some(current),
            _ => Some(link),
        })
    }
}
