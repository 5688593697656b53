//! prizepool-gateway server entry point.
//!
//! Starts the Axum HTTP server with REST and WebSocket endpoints and the
//! background expiry sweeper.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::routing::get;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use prizepool_gateway::api;
use prizepool_gateway::app_state::AppState;
use prizepool_gateway::config::GatewayConfig;
use prizepool_gateway::domain::EventBus;
use prizepool_gateway::repo::MemoryRepository;
use prizepool_gateway::service::{ExpirySweeper, PoolService, ThreadRngSource};
use prizepool_gateway::ws::handler::ws_handler;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = GatewayConfig::from_env()?;
    tracing::info!(addr = %config.listen_addr, "starting prizepool-gateway");

    // Build domain layer
    let repo = Arc::new(MemoryRepository::new());
    let event_bus = EventBus::new(config.event_bus_capacity);

    // Build service layer
    let pool_service = Arc::new(PoolService::new(
        repo,
        event_bus.clone(),
        Arc::new(ThreadRngSource),
        config.welcome_bonus_points,
    ));

    // Start the expiry sweeper
    let sweeper = ExpirySweeper::new(
        Arc::clone(&pool_service),
        Duration::from_secs(config.sweep_interval_secs),
    );
    tokio::spawn(sweeper.run());

    // Build application state
    let app_state = AppState {
        pool_service,
        event_bus,
    };

    // Build router
    let app = Router::new()
        .merge(api::build_router())
        .route("/ws", get(ws_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
