//! Domain types for Cadence
mod ids;
mod player;
mod status;
mod track;

pub use ids::{PlaylistId, TrackId};
pub use player::{PlayerState, PlayerStatus};
pub use status::OperationStatus;
pub use track::{DirectLink, PlaylistSummary, TrackMetadata};
