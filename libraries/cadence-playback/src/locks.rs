//! Per-id download serialization

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::OwnedMutexGuard;

/// One async mutex per logical id
///
/// Two downloads of the same id run one after the other; distinct ids never
/// wait on each other. Entries are dropped once nobody holds or waits for
/// them.
#[derive(Debug, Default)]
pub struct KeyedLocks {
    locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

/// Held while a download for one id is in progress
///
/// Also exists while the lock is still being waited for, so a waiter that
/// gives up prunes the entry just like a holder that finishes.
pub struct KeyGuard<'a> {
    owner: &'a KeyedLocks,
    key: String,
    guard: Option<OwnedMutexGuard<()>>,
}

impl KeyedLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `key`
    pub async fn acquire(&self, key: &str) -> KeyGuard<'_> {
        let mut pending = KeyGuard {
            owner: self,
            key: key.to_string(),
            guard: None,
        };
        let lock = {
            let mut locks = self.locks.lock().expect("keyed locks poisoned");
            Arc::clone(locks.entry(key.to_string()).or_default())
        };

        // `lock` moves into the wait; if this future is dropped mid-wait, the
        // wait goes first and `pending` then finds the map as sole owner
        pending.guard = Some(lock.lock_owned().await);
        pending
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.locks.lock().expect("keyed locks poisoned").len()
    }
}

impl Drop for KeyGuard<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());

        let mut locks = self.owner.locks.lock().expect("keyed locks poisoned");
        // Only the map holds it: nobody holds or waits
        if locks
            .get(&self.key)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(&self.key);
        }
    }
}
