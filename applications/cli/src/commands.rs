//! Cache maintenance commands
//!
//! Each command writes its human-readable output to `out` so it can be
//! captured in tests.

use crate::error::Result;
use cadence_cache::ContentCache;
use cadence_core::RemoteFetcher;
use cadence_playback::{store_stream, HttpFetcher};
use std::io::Write;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Print every manifest entry
pub fn list(cache: &ContentCache, out: &mut impl Write) -> Result<()> {
    let entries = cache.entries();
    if entries.is_empty() {
        writeln!(out, "Cache is empty")?;
        return Ok(());
    }

    writeln!(out, "{:<10} {:<36}  ID", "STATE", "STORAGE KEY")?;
    for entry in &entries {
        let state = if entry.committed { "committed" } else { "pending" };
        writeln!(out, "{:<10} {:<36}  {}", state, entry.storage_key, entry.logical_id)?;
    }
    writeln!(out, "\n{} entries", entries.len())?;
    Ok(())
}

/// Print the committed path of `logical_id`
pub fn path(cache: &ContentCache, logical_id: &str, out: &mut impl Write) -> Result<()> {
    let path = cache.path_of(logical_id)?;
    writeln!(out, "{}", path.display())?;
    Ok(())
}

/// Download `url` into the cache under `logical_id`
pub async fn fetch(
    cache: &Arc<ContentCache>,
    fetcher: &HttpFetcher,
    logical_id: &str,
    url: &str,
    out: &mut impl Write,
) -> Result<()> {
    let body = fetcher.open(url).await?;
    let stored = store_stream(cache, logical_id, body, &CancellationToken::new()).await?;

    info!(logical_id = %logical_id, path = %stored.display(), "Fetched into cache");
    writeln!(out, "{}", stored.display())?;
    Ok(())
}

/// Remove `logical_id` and its blob
pub fn remove(cache: &ContentCache, logical_id: &str, out: &mut impl Write) -> Result<()> {
    let existed = cache.contains(logical_id);
    cache.remove(logical_id)?;

    if existed {
        writeln!(out, "Removed {}", logical_id)?;
    } else {
        writeln!(out, "Not cached: {}", logical_id)?;
    }
    Ok(())
}

/// Drop uncommitted leftovers of interrupted downloads
pub fn purge(cache: &ContentCache, out: &mut impl Write) -> Result<()> {
    let removed = cache.purge_uncommitted()?;
    writeln!(out, "Purged {} uncommitted entries", removed)?;
    Ok(())
}
