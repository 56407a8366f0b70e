//! Per-key async mutex: at most one holder per key at a time.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Lock for one key plus the number of holders and waiters using it.
struct Slot {
    lock: Arc<AsyncMutex<()>>,
    users: usize,
}

/// Process-wide map of key -> lock. Entries are dropped once nobody holds or awaits them.
#[derive(Default)]
pub struct SingleFlight {
    slots: Mutex<HashMap<String, Slot>>,
}

impl SingleFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait until no other guard for `key` is alive, then hold it.
    ///
    /// Dropping the returned future while it waits releases its claim on the entry.
    pub async fn acquire(&self, key: &str) -> FlightGuard<'_> {
        let (lease, lock) = {
            let mut slots = self.slots();
            let slot = slots.entry(key.to_string()).or_insert_with(|| Slot {
                lock: Arc::default(),
                users: 0,
            });
            slot.users += 1;
            let lease = Lease {
                owner: self,
                key: key.to_string(),
            };
            (lease, Arc::clone(&slot.lock))
        };
        let guard = lock.lock_owned().await;
        FlightGuard {
            _guard: guard,
            _lease: lease,
        }
    }

    /// Keys currently held or awaited.
    pub fn len(&self) -> usize {
        self.slots().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn slots(&self) -> std::sync::MutexGuard<'_, HashMap<String, Slot>> {
        self.slots.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Claim on a map entry, held by waiters and holders alike.
struct Lease<'a> {
    owner: &'a SingleFlight,
    key: String,
}

impl Drop for Lease<'_> {
    fn drop(&mut self) {
        let mut slots = self.owner.slots();
        if let Some(slot) = slots.get_mut(&self.key) {
            slot.users -= 1;
            if slot.users == 0 {
                slots.remove(&self.key);
            }
        }
    }
}

/// Exclusive hold on a key. Fields drop in order: the lock is released before the lease.
pub struct FlightGuard<'a> {
    _guard: OwnedMutexGuard<()>,
    _lease: Lease<'a>,
}
