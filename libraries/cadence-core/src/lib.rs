//! Cadence Core
//!
//! Platform-agnostic core types, collaborator traits and the notification bus
//! shared by the cache and playback crates.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `TrackId`, `TrackMetadata`, `DirectLink`, `PlayerStatus`, etc.
//! - **Collaborator Traits**: `Catalog`, `PlaybackEngine`, `RemoteFetcher`
//! - **Notification Bus**: `NotificationBus` with owner-held `Subscription` tokens
//! - **Derived Values**: `AsyncValue` tagged with an `OperationStatus`
//! - **Error Handling**: `CoreError` and `Result`
//!
//! # Example
//!
//! ```rust
//! use cadence_core::{NotificationBus, OperationStatus};
//! use std::sync::{Arc, Mutex};
//!
//! let bus = NotificationBus::<OperationStatus>::new();
//! let seen = Arc::new(Mutex::new(Vec::new()));
//!
//! let sink = Arc::clone(&seen);
//! let subscription = bus.subscribe(move |status| sink.lock().unwrap().push(*status));
//!
//! bus.emit(&OperationStatus::Pending).unwrap();
//! drop(subscription);
//! bus.emit(&OperationStatus::Completed).unwrap();
//!
//! assert_eq!(*seen.lock().unwrap(), vec![OperationStatus::Pending]);
//! ```

#![forbid(unsafe_code)]

pub mod async_value;
pub mod bus;
pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use async_value::AsyncValue;
pub use bus::{EmitError, NotificationBus, Subscription};
pub use error::{CoreError, Result};
pub use traits::{ByteStream, Catalog, PlaybackEngine, RemoteFetcher};
pub use types::{
    DirectLink, OperationStatus, PlayerState, PlayerStatus, PlaylistId, PlaylistSummary,
    TrackId, TrackMetadata,
};
