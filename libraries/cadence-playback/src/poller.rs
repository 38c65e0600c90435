//! Periodic engine status polling

use crate::types::PlaybackConfig;
use cadence_core::{NotificationBus, PlaybackEngine, PlayerStatus, Subscription};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Republishes `engine.status()` on a fixed interval
///
/// `None` is published while nothing is loaded. The loop stops when the
/// poller is dropped or shut down.
pub struct StatusPoller {
    status_updated: NotificationBus<Option<PlayerStatus>>,
    token: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl StatusPoller {
    /// Start polling; must be called from within a Tokio runtime
    pub fn spawn(engine: Arc<dyn PlaybackEngine>, interval: Duration) -> Self {
        let status_updated = NotificationBus::new();
        let token = CancellationToken::new();

        let bus = status_updated.clone();
        let stop = token.clone();
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    () = stop.cancelled() => break,
                    _ = ticker.tick() => {
                        if let Err(err) = bus.emit(&engine.status()) {
                            debug!(error = %err, "Status listeners reported failures");
                        }
                    }
                }
            }
            debug!("Status poller stopped");
        });

        Self {
            status_updated,
            token,
            handle: Some(handle),
        }
    }

    /// Start polling at `config.status_poll_interval`
    pub fn from_config(engine: Arc<dyn PlaybackEngine>, config: &PlaybackConfig) -> Self {
        Self::spawn(engine, config.status_poll_interval)
    }

    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&Option<PlayerStatus>) + Send + Sync + 'static,
    {
        self.status_updated.subscribe(callback)
    }

    /// Stop polling and wait for the loop to exit
    pub async fn shutdown(mut self) {
        self.token.cancel();
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for StatusPoller {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
