//! Cadence Cache
//!
//! Durable mapping from logical identifiers (`"remote/track/42/audio"`) to
//! blobs on disk. A blob is either fully present and usable or invisible,
//! even across crashes.
//!
//! # Two-phase protocol
//!
//! 1. [`ContentCache::begin`] drops any previous entry for the id, allocates a
//!    fresh storage key and records an *uncommitted* entry in the manifest.
//! 2. The caller writes the blob to the returned path.
//! 3. [`ContentCache::commit`] flips the entry to committed.
//!
//! Only committed entries are ever reported by [`ContentCache::exists_committed`]
//! and [`ContentCache::path_of`]. An uncommitted entry left behind by a crash or
//! a cancelled download is a plain miss, and the next `begin` for that id
//! cleans it up.
//!
//! # Layout
//!
//! ```text
//! cache/
//! ├── meta.json                               # Manifest (single source of truth)
//! └── data/
//!     ├── 0d5b6f0e-3c1e-4a7b-9f0e-2f8c1d9a7b31  # One file per storage key
//!     └── 9a7e2c44-51d8-4c0f-8b2a-6e3f0d1c2b45
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use cadence_cache::ContentCache;
//!
//! # fn main() -> cadence_cache::Result<()> {
//! let cache = ContentCache::open("./cache")?;
//!
//! let target = cache.begin("remote/track/42/audio")?;
//! std::fs::write(&target, b"...").expect("write blob");
//! cache.commit("remote/track/42/audio")?;
//!
//! assert_eq!(cache.path_of("remote/track/42/audio")?, target);
//! # Ok(())
//! # }
//! ```

mod cache;
mod error;
mod manifest;

pub use cache::ContentCache;
pub use error::{CacheError, Result};
pub use manifest::{CacheEntry, CacheManifest, MANIFEST_VERSION};
