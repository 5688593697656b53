//! Per-connection subscription filter.
//!
//! Tracks which pools a WebSocket client wants events for and provides
//! server-side filtering. A fresh connection receives everything; the
//! first explicit `subscribe` narrows the stream to the named pools.

use std::collections::HashSet;

use crate::domain::PoolId;

/// Event filter for a single WebSocket connection.
#[derive(Debug)]
pub struct SubscriptionFilter {
    /// Subscribed pool IDs. Ignored while `all` is set.
    pool_ids: HashSet<PoolId>,
    /// Whether the client receives events for every pool.
    all: bool,
}

impl SubscriptionFilter {
    /// Creates a filter in its initial receive-everything state.
    #[must_use]
    pub fn new() -> Self {
        Self {
            pool_ids: HashSet::new(),
            all: true,
        }
    }

    /// Subscribes to the given pools, or to everything when `wildcard`
    /// is set. A non-wildcard subscribe replaces the receive-everything
    /// default with the explicit set.
    pub fn subscribe(&mut self, ids: &[PoolId], wildcard: bool) {
        self.all = wildcard;
        for id in ids {
            self.pool_ids.insert(*id);
        }
    }

    /// Removes pool IDs from the subscription set.
    pub fn unsubscribe(&mut self, ids: &[PoolId]) {
        for id in ids {
            self.pool_ids.remove(id);
        }
    }

    /// Returns `true` if events for `pool_id` should be forwarded.
    #[must_use]
    pub fn matches(&self, pool_id: PoolId) -> bool {
        self.all || self.pool_ids.contains(&pool_id)
    }

    /// Returns the number of explicitly subscribed pool IDs.
    #[must_use]
    pub fn count(&self) -> usize {
        self.pool_ids.len()
    }

    /// Returns `true` if the receive-everything mode is active.
    #[must_use]
    pub fn is_all(&self) -> bool {
        self.all
    }
}

impl Default for SubscriptionFilter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn fresh_filter_matches_everything() {
        let filter = SubscriptionFilter::new();
        assert!(filter.matches(PoolId::new()));
    }

    #[test]
    fn explicit_subscribe_narrows_the_stream() {
        let mut filter = SubscriptionFilter::new();
        let id = PoolId::new();
        filter.subscribe(&[id], false);
        assert!(filter.matches(id));
        assert!(!filter.matches(PoolId::new()));
        assert!(!filter.is_all());
    }

    #[test]
    fn wildcard_restores_receive_everything() {
        let mut filter = SubscriptionFilter::new();
        filter.subscribe(&[PoolId::new()], false);
        filter.subscribe(&[], true);
        assert!(filter.matches(PoolId::new()));
        assert!(filter.is_all());
    }

    #[test]
    fn unsubscribe_removes_pool() {
        let mut filter = SubscriptionFilter::new();
        let id = PoolId::new();
        filter.subscribe(&[id], false);
        assert!(filter.matches(id));
        filter.unsubscribe(&[id]);
        assert!(!filter.matches(id));
    }

    #[test]
    fn count_tracks_explicit() {
        let mut filter = SubscriptionFilter::new();
        assert_eq!(filter.count(), 0);
        filter.subscribe(&[PoolId::new(), PoolId::new()], false);
        assert_eq!(filter.count(), 2);
    }
}
