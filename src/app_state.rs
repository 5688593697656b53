//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::domain::EventBus;
use crate::repo::MemoryRepository;
use crate::service::PoolService;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Settlement engine for all business logic.
    pub pool_service: Arc<PoolService<MemoryRepository>>,
    /// Event bus for WebSocket subscriptions.
    pub event_bus: EventBus,
}
