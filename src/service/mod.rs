//! Service layer: the settlement engine, the expiry sweeper, and the
//! randomness seam used for winner selection.

pub mod pool_service;
pub mod rng;
pub mod sweeper;

pub use pool_service::{PoolDetail, PoolService};
pub use rng::{RandomSource, ThreadRngSource};
pub use sweeper::ExpirySweeper;
