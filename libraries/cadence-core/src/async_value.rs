//! Asynchronously derived values
//!
//! Playlist lists, track lists and similar values are produced by remote
//! calls. `AsyncValue` pairs such a value with its [`OperationStatus`] and
//! notifies subscribers on every transition.

use crate::bus::{NotificationBus, Subscription};
use crate::types::OperationStatus;
use std::sync::Mutex;
use tracing::debug;

struct Slot<T> {
    status: OperationStatus,
    value: Option<T>,
}

/// A value produced asynchronously, tagged with its lifecycle status
pub struct AsyncValue<T> {
    slot: Mutex<Slot<T>>,
    changed: NotificationBus<OperationStatus>,
}

impl<T: Clone> AsyncValue<T> {
    /// Create an `Empty` value
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(Slot {
                status: OperationStatus::Empty,
                value: None,
            }),
            changed: NotificationBus::new(),
        }
    }

    /// Mark work as enqueued
    pub fn begin(&self) {
        self.transition(OperationStatus::Pending, None);
    }

    /// Store the produced value and mark it completed
    pub fn complete(&self, value: T) {
        self.transition(OperationStatus::Completed, Some(value));
    }

    /// Mark the work as failed
    ///
    /// A previously completed value is kept.
    pub fn reject(&self) {
        self.transition(OperationStatus::Rejected, None);
    }

    /// Current status
    pub fn status(&self) -> OperationStatus {
        self.lock().status
    }

    /// Last produced value, if any
    pub fn value(&self) -> Option<T> {
        self.lock().value.clone()
    }

    /// Get notified of every status transition
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&OperationStatus) + Send + Sync + 'static,
    {
        self.changed.subscribe(callback)
    }

    fn transition(&self, status: OperationStatus, value: Option<T>) {
        {
            let mut slot = self.lock();
            slot.status = status;
            if value.is_some() {
                slot.value = value;
            }
        }

        if let Err(err) = self.changed.emit(&status) {
            debug!(status = %status, error = %err, "Status listeners reported failures");
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Slot<T>> {
        self.slot.lock().expect("async value slot poisoned")
    }
}

impl<T: Clone> Default for AsyncValue<T> {
    fn default() -> Self {
        Self::new()
    }
}
