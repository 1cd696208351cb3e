//! Per-key serialization for read-modify-write sequences

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// One async mutex per canonical store key.
///
/// Every read-modify-write against a key runs under that key's lock:
/// the existence check before a create, and the child-list updates on
/// directory nodes. Lock order is child before parent everywhere, so
/// nested acquisitions cannot cycle. Entries are retained for the
/// process lifetime; the map is bounded by the set of keys touched, not
/// by call volume.
///
/// This serializes writers within one process. Multiple processes
/// sharing a store need coordination at the backend (conditional
/// writes) instead.
#[derive(Debug, Default)]
pub struct KeyLocks {
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl KeyLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the lock for `key`, creating it on first use.
    pub async fn acquire(&self, key: &str) -> OwnedMutexGuard<()> {
        let lock = self
            .locks
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        lock.lock_owned().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_key_is_exclusive() {
        let locks = Arc::new(KeyLocks::new());

        let guard = locks.acquire("k").await;

        let locks2 = locks.clone();
        let contender = tokio::spawn(async move {
            let _guard = locks2.acquire("k").await;
        });

        // the second acquisition must block while the guard is held
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!contender.is_finished());

        drop(guard);
        tokio::time::timeout(Duration::from_secs(1), contender)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_distinct_keys_do_not_contend() {
        let locks = KeyLocks::new();
        let _a = locks.acquire("a").await;
        // must not deadlock
        let _b = locks.acquire("b").await;
    }
}
