//! Content cache with a two-phase create/commit protocol

use crate::error::{CacheError, Result};
use crate::manifest::{temp_path, CacheEntry, CacheManifest, MANIFEST_VERSION};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, warn};
use uuid::Uuid;

const MANIFEST_FILE: &str = "meta.json";
const DATA_DIR: &str = "data";

/// Durable logical-id → blob mapping
///
/// Every mutation rewrites the manifest before returning. Mutations are
/// staged on a copy of the manifest and only become visible in memory once
/// the rewrite succeeded, so memory and disk never disagree after an error.
///
/// All methods block on file I/O (mutations fsync). Async callers should
/// run mutations on the blocking pool.
#[derive(Debug)]
pub struct ContentCache {
    root: PathBuf,
    data_dir: PathBuf,
    manifest_path: PathBuf,
    manifest: Mutex<CacheManifest>,
}

impl ContentCache {
    /// Open (or create) a cache rooted at `root`
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let data_dir = root.join(DATA_DIR);
        let manifest_path = root.join(MANIFEST_FILE);

        fs::create_dir_all(&data_dir).map_err(CacheError::io(&data_dir))?;

        // A leftover temp file is an interrupted rewrite; meta.json is still intact.
        let tmp = temp_path(&manifest_path);
        if tmp.exists() {
            warn!(path = %tmp.display(), "Discarding interrupted manifest rewrite");
            fs::remove_file(&tmp).map_err(CacheError::io(&tmp))?;
        }

        let manifest = CacheManifest::load(&manifest_path)?;
        let pending = manifest.entries.values().filter(|e| !e.committed).count();
        info!(
            root = %root.display(),
            entries = manifest.entries.len(),
            uncommitted = pending,
            "Content cache opened"
        );

        Ok(Self {
            root,
            data_dir,
            manifest_path,
            manifest: Mutex::new(manifest),
        })
    }

    /// Cache root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding one file per storage key
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// True iff an entry exists and is committed
    pub fn exists_committed(&self, logical_id: &str) -> bool {
        self.lock()
            .entries
            .get(logical_id)
            .is_some_and(|e| e.committed)
    }

    /// True if any entry exists for `logical_id`, committed or not
    pub fn contains(&self, logical_id: &str) -> bool {
        self.lock().entries.contains_key(logical_id)
    }

    /// Start a fresh write slot for `logical_id`
    ///
    /// Any existing entry (committed or not) is removed first, including its
    /// backing file. The new uncommitted entry is persisted before the target
    /// path is handed out.
    pub fn begin(&self, logical_id: &str) -> Result<PathBuf> {
        let mut manifest = self.lock();

        if manifest.entries.contains_key(logical_id) {
            self.remove_locked(&mut manifest, logical_id)?;
        }

        let mut storage_key = Uuid::new_v4().to_string();
        while manifest.uses_storage_key(&storage_key) {
            storage_key = Uuid::new_v4().to_string();
        }

        let mut staged = manifest.clone();
        staged.entries.insert(
            logical_id.to_string(),
            CacheEntry {
                logical_id: logical_id.to_string(),
                storage_key: storage_key.clone(),
                committed: false,
            },
        );
        self.store(&mut manifest, staged)?;

        let target = self.data_dir.join(&storage_key);
        debug!(logical_id = %logical_id, target = %target.display(), "Cache write started");
        Ok(target)
    }

    /// Mark the entry for `logical_id` as complete and usable
    ///
    /// The caller must have fully written the blob at the path returned by
    /// [`begin`](Self::begin).
    pub fn commit(&self, logical_id: &str) -> Result<()> {
        let mut manifest = self.lock();
        let entry = manifest
            .entries
            .get(logical_id)
            .ok_or_else(|| CacheError::NotFound(logical_id.to_string()))?;

        if !self.data_dir.join(&entry.storage_key).is_file() {
            return Err(CacheError::MissingBlob(logical_id.to_string()));
        }

        let mut staged = manifest.clone();
        if let Some(entry) = staged.entries.get_mut(logical_id) {
            entry.committed = true;
        }
        self.store(&mut manifest, staged)?;

        debug!(logical_id = %logical_id, "Cache entry committed");
        Ok(())
    }

    /// Flip a committed entry back to uncommitted without deleting its bytes
    pub fn uncommit(&self, logical_id: &str) -> Result<()> {
        let mut manifest = self.lock();
        if !manifest.entries.contains_key(logical_id) {
            return Err(CacheError::NotFound(logical_id.to_string()));
        }

        let mut staged = manifest.clone();
        if let Some(entry) = staged.entries.get_mut(logical_id) {
            entry.committed = false;
        }
        self.store(&mut manifest, staged)
    }

    /// Path of a committed blob
    pub fn path_of(&self, logical_id: &str) -> Result<PathBuf> {
        match self.lock().entries.get(logical_id) {
            Some(entry) if entry.committed => Ok(self.data_dir.join(&entry.storage_key)),
            _ => Err(CacheError::NotFound(logical_id.to_string())),
        }
    }

    /// Delete the entry and its backing file; removing an unknown id is a no-op
    pub fn remove(&self, logical_id: &str) -> Result<()> {
        let mut manifest = self.lock();
        if !manifest.entries.contains_key(logical_id) {
            return Ok(());
        }
        self.remove_locked(&mut manifest, logical_id)
    }

    /// Snapshot of all entries, ordered by logical id
    pub fn entries(&self) -> Vec<CacheEntry> {
        self.lock().entries.values().cloned().collect()
    }

    /// Remove every uncommitted entry and return how many were dropped
    pub fn purge_uncommitted(&self) -> Result<usize> {
        let mut manifest = self.lock();
        let stale: Vec<String> = manifest
            .entries
            .values()
            .filter(|e| !e.committed)
            .map(|e| e.logical_id.clone())
            .collect();

        for logical_id in &stale {
            self.remove_locked(&mut manifest, logical_id)?;
        }

        if !stale.is_empty() {
            info!(count = stale.len(), "Purged uncommitted cache entries");
        }
        Ok(stale.len())
    }

    /// Drop the manifest entry first, then unlink its file
    ///
    /// The manifest therefore never describes a file that is already gone.
    fn remove_locked(&self, manifest: &mut CacheManifest, logical_id: &str) -> Result<()> {
        let mut staged = manifest.clone();
        let Some(entry) = staged.entries.remove(logical_id) else {
            return Ok(());
        };
        self.store(manifest, staged)?;

        let path = self.data_dir.join(&entry.storage_key);
        match fs::remove_file(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(CacheError::io(&path)(e)),
        }

        debug!(logical_id = %logical_id, committed = entry.committed, "Cache entry removed");
        Ok(())
    }

    /// Persist `staged` and make it the live manifest
    fn store(&self, live: &mut CacheManifest, mut staged: CacheManifest) -> Result<()> {
        staged.version = MANIFEST_VERSION;
        staged.persist(&self.manifest_path)?;
        *live = staged;
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, CacheManifest> {
        self.manifest.lock().expect("cache manifest poisoned")
    }
}
