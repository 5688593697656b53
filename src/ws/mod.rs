//! WebSocket layer: live pool lifecycle events for connected clients.
//!
//! Clients receive `pool_created`, `pool_updated`, and `pool_completed`
//! events. A fresh connection receives every event; a client can narrow
//! the stream to specific pools with a `subscribe` command.

pub mod connection;
pub mod handler;
pub mod messages;
pub mod subscription;
