//! Per-pool mutual exclusion.
//!
//! [`PoolLocks`] is a keyed lock table: one [`tokio::sync::Mutex`] per
//! pool id, created lazily and never removed. Both the join path and the
//! expiry sweep acquire a pool's lock before inspecting or mutating its
//! state, which guarantees that for any given pool at most one of
//! {join, settlement} runs at a time and that settlement executes at
//! most once regardless of which trigger requested it.
//!
//! Holders must re-check pool status after acquiring the lock: the pool
//! may have settled between the decision to act and acquisition.
//! Read-only operations (listing pools, fetching details) never take
//! these locks and tolerate just-stale snapshots.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};

use super::PoolId;

/// Keyed lock table providing one mutual-exclusion unit per pool.
#[derive(Debug, Default)]
pub struct PoolLocks {
    locks: RwLock<HashMap<PoolId, Arc<Mutex<()>>>>,
}

impl PoolLocks {
    /// Creates an empty lock table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquires the lock for `pool_id`, creating it on first use.
    ///
    /// The returned guard is owned, so it can be held across `.await`
    /// points and moved into the critical section scope.
    pub async fn acquire(&self, pool_id: PoolId) -> OwnedMutexGuard<()> {
        let existing = {
            let map = self.locks.read().await;
            map.get(&pool_id).map(Arc::clone)
        };

        let lock = match existing {
            Some(lock) => lock,
            None => {
                let mut map = self.locks.write().await;
                Arc::clone(map.entry(pool_id).or_default())
            }
        };

        lock.lock_owned().await
    }

    /// Returns the number of lock entries created so far.
    pub async fn len(&self) -> usize {
        self.locks.read().await.len()
    }

    /// Returns `true` if no lock entry has been created yet.
    pub async fn is_empty(&self) -> bool {
        self.locks.read().await.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn entries_are_created_lazily_and_reused() {
        let locks = PoolLocks::new();
        assert!(locks.is_empty().await);

        let id = PoolId::new();
        drop(locks.acquire(id).await);
        drop(locks.acquire(id).await);
        assert_eq!(locks.len().await, 1);

        drop(locks.acquire(PoolId::new()).await);
        assert_eq!(locks.len().await, 2);
    }

    #[tokio::test]
    async fn same_pool_critical_sections_never_interleave() {
        let locks = Arc::new(PoolLocks::new());
        let id = PoolId::new();
        let in_section = Arc::new(AtomicU32::new(0));
        let max_seen = Arc::new(AtomicU32::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let locks = Arc::clone(&locks);
            let in_section = Arc::clone(&in_section);
            let max_seen = Arc::clone(&max_seen);
            handles.push(tokio::spawn(async move {
                let _guard = locks.acquire(id).await;
                let now = in_section.fetch_add(1, Ordering::SeqCst) + 1;
                max_seen.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(2)).await;
                in_section.fetch_sub(1, Ordering::SeqCst);
            }));
        }
        for handle in handles {
            let Ok(()) = handle.await else {
                panic!("task panicked");
            };
        }

        assert_eq!(max_seen.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn different_pools_do_not_block_each_other() {
        let locks = PoolLocks::new();
        let guard_a = locks.acquire(PoolId::new()).await;

        // Acquiring a different pool's lock must not wait on guard_a.
        let acquired = tokio::time::timeout(
            Duration::from_millis(100),
            locks.acquire(PoolId::new()),
        )
        .await;
        assert!(acquired.is_ok());
        drop(guard_a);
    }
}
