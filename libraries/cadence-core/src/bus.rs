//! Notification bus
//!
//! Publish/subscribe where the subscriber, not the bus, owns the relation.
//! `subscribe` hands back a [`Subscription`] token; dropping it (or calling
//! [`Subscription::dispose`]) removes the callback. The bus itself only keeps
//! callbacks for tokens that are still alive and never unsubscribes anyone on
//! its own.
//!
//! Emission works on a snapshot of the subscriber set taken when `emit` is
//! called, so callbacks may freely subscribe, unsubscribe or emit again.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, Weak};
use thiserror::Error;
use tracing::warn;

type Callback<T> = Arc<dyn Fn(&T) -> anyhow::Result<()> + Send + Sync>;

struct Registry<T> {
    next_id: u64,
    callbacks: HashMap<u64, Callback<T>>,
}

/// Type-erased removal hook held weakly by subscriptions
trait Unregister: Send + Sync {
    fn unregister(&self, id: u64);
    fn is_registered(&self, id: u64) -> bool;
}

impl<T> Unregister for Mutex<Registry<T>> {
    fn unregister(&self, id: u64) {
        self.lock()
            .expect("notification bus registry poisoned")
            .callbacks
            .remove(&id);
    }

    fn is_registered(&self, id: u64) -> bool {
        self.lock()
            .expect("notification bus registry poisoned")
            .callbacks
            .contains_key(&id)
    }
}

/// One or more subscribers failed while handling an emission
///
/// Every subscriber still ran; this carries the failures in invocation order.
#[derive(Debug, Error)]
#[error("{} subscriber(s) failed: {}", .failures.len(), first_failure(.failures))]
pub struct EmitError {
    pub failures: Vec<anyhow::Error>,
}

fn first_failure(failures: &[anyhow::Error]) -> String {
    failures.first().map(ToString::to_string).unwrap_or_default()
}

/// Publish/subscribe primitive carrying values of type `T`
///
/// Cloning is cheap; clones share one subscriber set.
pub struct NotificationBus<T> {
    registry: Arc<Mutex<Registry<T>>>,
}

impl<T: 'static> NotificationBus<T> {
    /// Create a bus with no subscribers
    pub fn new() -> Self {
        Self {
            registry: Arc::new(Mutex::new(Registry {
                next_id: 0,
                callbacks: HashMap::new(),
            })),
        }
    }

    /// Register a callback that cannot fail
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.subscribe_fallible(move |value| {
            callback(value);
            Ok(())
        })
    }

    /// Register a callback whose failures are reported back to the emitter
    pub fn subscribe_fallible<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&T) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let id = {
            let mut registry = self.lock();
            let id = registry.next_id;
            registry.next_id += 1;
            registry.callbacks.insert(id, Arc::new(callback));
            id
        };

        let weak: Weak<Mutex<Registry<T>>> = Arc::downgrade(&self.registry);
        let registry: Weak<dyn Unregister> = weak;
        Subscription { registry, id }
    }

    /// Invoke every live callback with `value`
    ///
    /// A failing callback is logged and does not stop the others. Failures
    /// are returned together once all callbacks have run.
    pub fn emit(&self, value: &T) -> Result<(), EmitError> {
        let snapshot: Vec<Callback<T>> = self.lock().callbacks.values().cloned().collect();

        let mut failures = Vec::new();
        for callback in snapshot {
            if let Err(err) = callback(value) {
                warn!(error = %err, "Notification subscriber failed");
                failures.push(err);
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(EmitError { failures })
        }
    }

    /// Number of live subscriptions
    pub fn len(&self) -> usize {
        self.lock().callbacks.len()
    }

    /// Whether there are no live subscriptions
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Registry<T>> {
        self.registry
            .lock()
            .expect("notification bus registry poisoned")
    }
}

impl<T: 'static> Default for NotificationBus<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for NotificationBus<T> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
        }
    }
}

impl<T> fmt::Debug for NotificationBus<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let subscribers = self
            .registry
            .lock()
            .map(|r| r.callbacks.len())
            .unwrap_or_default();
        f.debug_struct("NotificationBus")
            .field("subscribers", &subscribers)
            .finish()
    }
}

/// Owner token for one bus registration
///
/// The registration lives exactly as long as this token. Wrap it in an `Arc`
/// to share ownership; the callback is removed when the last reference goes.
#[must_use = "dropping a Subscription immediately unsubscribes it"]
pub struct Subscription {
    registry: Weak<dyn Unregister>,
    id: u64,
}

impl Subscription {
    /// Remove the registration now
    pub fn dispose(self) {
        drop(self);
    }

    /// Whether the callback is still registered on a live bus
    pub fn is_active(&self) -> bool {
        self.registry
            .upgrade()
            .is_some_and(|registry| registry.is_registered(self.id))
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.unregister(self.id);
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}
