//! # prizepool-gateway
//!
//! REST API and WebSocket gateway for timed stake-and-win prize pools.
//!
//! Users stake points to enter capacity-bounded pools. A pool settles when
//! it fills or when its deadline passes: winners are drawn uniformly at
//! random, 90% of the accumulated stakes are split between them, and every
//! balance change is recorded in an append-only ledger.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP, WebSocket)
//!     │
//!     ├── REST Handlers (api/)
//!     ├── WS Handler (ws/)
//!     │
//!     ├── PoolService + ExpirySweeper (service/)
//!     ├── EventBus + PoolLocks (domain/)
//!     │
//!     └── Repository (repo/)
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod repo;
pub mod service;
pub mod ws;
