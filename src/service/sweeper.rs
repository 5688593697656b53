//! Background task that settles pools whose deadline passed unfilled.
//!
//! Join-triggered settlement covers pools that fill; this sweeper is the
//! liveness guarantee for the rest. It ticks on a fixed interval and
//! funnels every candidate through [`PoolService::settle_expired`], which
//! takes the same per-pool lock as the join path, so a pool caught by
//! both triggers still settles exactly once.

use std::sync::Arc;
use std::time::Duration;

use crate::repo::Repository;
use crate::service::PoolService;

/// Periodic expiry sweep over all active pools.
#[derive(Debug)]
pub struct ExpirySweeper<R> {
    service: Arc<PoolService<R>>,
    interval: Duration,
}

impl<R: Repository> ExpirySweeper<R> {
    /// Creates a sweeper ticking every `interval`.
    #[must_use]
    pub fn new(service: Arc<PoolService<R>>, interval: Duration) -> Self {
        Self { service, interval }
    }

    /// Runs the sweep loop until the task is dropped.
    ///
    /// A failed sweep is logged and retried on the next tick; the loop
    /// itself never exits on error.
    pub async fn run(self) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        tracing::info!(interval_secs = self.interval.as_secs(), "expiry sweeper started");
        loop {
            ticker.tick().await;
            match self.service.settle_expired().await {
                Ok(0) => {}
                Ok(settled) => {
                    tracing::info!(settled, "expiry sweep settled pools");
                }
                Err(error) => {
                    tracing::error!(%error, "expiry sweep failed");
                }
            }
        }
    }
}
