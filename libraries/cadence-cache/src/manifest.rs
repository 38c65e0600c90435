//! Persisted cache manifest
//!
//! The manifest is one JSON document:
//!
//! ```json
//! {
//!   "version": 1,
//!   "entries": {
//!     "remote/track/42/audio": {
//!       "id": "remote/track/42/audio",
//!       "storage_key": "0d5b6f0e-3c1e-4a7b-9f0e-2f8c1d9a7b31",
//!       "committed": true
//!     }
//!   }
//! }
//! ```
//!
//! Every rewrite goes to `meta.json.tmp` first, is synced, and then renamed
//! over `meta.json`, so a crash mid-write leaves either the old or the new
//! document.

use crate::error::{CacheError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Newest manifest version this crate understands
pub const MANIFEST_VERSION: u32 = 1;

/// One cached blob
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    #[serde(rename = "id")]
    pub logical_id: String,

    /// Opaque file name under the data directory
    pub storage_key: String,

    /// Whether the blob is fully written and usable
    pub committed: bool,
}

/// In-memory image of `meta.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheManifest {
    pub version: u32,
    pub entries: BTreeMap<String, CacheEntry>,
}

impl Default for CacheManifest {
    fn default() -> Self {
        Self {
            version: MANIFEST_VERSION,
            entries: BTreeMap::new(),
        }
    }
}

impl CacheManifest {
    /// Load the manifest at `path`, or an empty one when the file is absent
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(CacheError::io(path)(e)),
        };

        let manifest: Self = serde_json::from_slice(&bytes)
            .map_err(|e| CacheError::Manifest(format!("{}: {}", path.display(), e)))?;

        if manifest.version > MANIFEST_VERSION {
            return Err(CacheError::Manifest(format!(
                "unsupported manifest version {} (newest known is {})",
                manifest.version, MANIFEST_VERSION
            )));
        }

        Ok(manifest)
    }

    /// Atomically replace the manifest at `path` with this one
    pub fn persist(&self, path: &Path) -> Result<()> {
        let tmp = temp_path(path);
        let json = serde_json::to_vec_pretty(self)
            .map_err(|e| CacheError::Manifest(e.to_string()))?;

        let mut file = File::create(&tmp).map_err(CacheError::io(&tmp))?;
        file.write_all(&json).map_err(CacheError::io(&tmp))?;
        file.sync_all().map_err(CacheError::io(&tmp))?;
        drop(file);

        fs::rename(&tmp, path).map_err(CacheError::io(path))
    }

    /// Whether a live entry already uses `storage_key`
    pub(crate) fn uses_storage_key(&self, storage_key: &str) -> bool {
        self.entries.values().any(|e| e.storage_key == storage_key)
    }
}

/// Sibling path used for the write-then-rename step
pub(crate) fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_manifest_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = CacheManifest::load(&dir.path().join("meta.json")).unwrap();
        assert_eq!(manifest, CacheManifest::default());
    }

    #[test]
    fn test_persist_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("meta.json");

        let mut manifest = CacheManifest::default();
        manifest.entries.insert(
            "a/audio".to_string(),
            CacheEntry {
                logical_id: "a/audio".to_string(),
                storage_key: "k1".to_string(),
                committed: true,
            },
        );
        manifest.persist(&path).unwrap();

        assert_eq!(CacheManifest::load(&path).unwrap(), manifest);
        assert!(!temp_path(&path).exists());
    }

    #[test]
    fn test_entry_serializes_logical_id_as_id() {
        let entry = CacheEntry {
            logical_id: "x".to_string(),
            storage_key: "k".to_string(),
            committed: false,
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["id"], "x");
        assert_eq!(json["storage_key"], "k");
        assert_eq!(json["committed"], false);
    }

    #[test]
    fn test_legacy_version_zero_is_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("meta.json");
        fs::write(&path, r#"{"version":0,"entries":{}}"#).unwrap();

        assert_eq!(CacheManifest::load(&path).unwrap().version, 0);
    }

    #[test]
    fn test_newer_version_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("meta.json");
        fs::write(&path, r#"{"version":99,"entries":{}}"#).unwrap();

        assert!(matches!(
            CacheManifest::load(&path),
            Err(CacheError::Manifest(_))
        ));
    }

    #[test]
    fn test_corrupt_manifest_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("meta.json");
        fs::write(&path, b"{\"version\": 1, \"entr").unwrap();

        assert!(matches!(
            CacheManifest::load(&path),
            Err(CacheError::Manifest(_))
        ));
    }
}
