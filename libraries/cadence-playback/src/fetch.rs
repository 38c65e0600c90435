//! Remote byte transfer into the cache

use crate::error::{PlaybackError, Result};
use async_trait::async_trait;
use cadence_cache::ContentCache;
use cadence_core::{ByteStream, CoreError, RemoteFetcher};
use futures_util::StreamExt;
use reqwest::Client;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// [`RemoteFetcher`] backed by `reqwest`
///
/// A non-success HTTP status is reported as a network error.
#[derive(Debug, Clone, Default)]
pub struct HttpFetcher {
    http: Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reuse an existing client (connection pool, proxy settings)
    pub fn with_client(http: Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl RemoteFetcher for HttpFetcher {
    async fn open(&self, url: &str) -> cadence_core::Result<ByteStream> {
        debug!(url = %url, "Opening remote stream");

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| CoreError::network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CoreError::network(format!(
                "GET {} returned {}",
                url, status
            )));
        }

        Ok(response
            .bytes_stream()
            .map(|chunk| chunk.map_err(|e| CoreError::network(e.to_string())))
            .boxed())
    }
}

/// Run `future` unless `token` fires first
pub(crate) async fn until_cancelled<F: Future>(
    token: &CancellationToken,
    future: F,
) -> Result<F::Output> {
    tokio::select! {
        biased;
        () = token.cancelled() => Err(PlaybackError::Cancelled),
        output = future => Ok(output),
    }
}

/// Run a synchronous cache operation on the blocking pool
///
/// Manifest writes fsync and rename.
async fn on_cache<T, F>(cache: &Arc<ContentCache>, op: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce(&ContentCache) -> cadence_cache::Result<T> + Send + 'static,
{
    let cache = Arc::clone(cache);
    let output = tokio::task::spawn_blocking(move || op(&cache))
        .await
        .map_err(std::io::Error::other)?;
    Ok(output?)
}

/// Stream `body` into a fresh cache slot for `logical_id` and commit it
///
/// Cancellation is checked between chunks. A cancelled or failed transfer
/// leaves an uncommitted entry behind, which the next `begin` cleans up.
pub async fn store_stream(
    cache: &Arc<ContentCache>,
    logical_id: &str,
    mut body: ByteStream,
    token: &CancellationToken,
) -> Result<PathBuf> {
    let id = logical_id.to_string();
    let target = on_cache(cache, move |cache| cache.begin(&id)).await?;
    let mut file = File::create(&target).await?;
    let mut written: u64 = 0;

    while let Some(chunk) = until_cancelled(token, body.next()).await? {
        let chunk = chunk.map_err(|e| PlaybackError::Network(e.to_string()))?;
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }

    file.flush().await?;
    file.sync_all().await?;
    drop(file);

    if token.is_cancelled() {
        return Err(PlaybackError::Cancelled);
    }
    let id = logical_id.to_string();
    on_cache(cache, move |cache| cache.commit(&id)).await?;

    debug!(logical_id = %logical_id, size = written, "Blob stored");
    Ok(target)
}
