//! Domain layer: core entities, identifiers, events, and synchronization.
//!
//! This module contains the server-side domain model: user and pool
//! entities, the append-only transaction ledger types, the event bus for
//! broadcasting lifecycle changes, and the per-pool lock table that
//! serializes join and settlement.

pub mod event_bus;
pub mod ids;
pub mod model;
pub mod pool_event;
pub mod pool_locks;

pub use event_bus::EventBus;
pub use ids::{PoolId, UserId};
pub use model::{
    NewPool, NewTransaction, Participant, Pool, PoolCategory, PoolResult, PoolStatus, Transaction,
    TransactionKind, User,
};
pub use pool_event::PoolEvent;
pub use pool_locks::PoolLocks;
