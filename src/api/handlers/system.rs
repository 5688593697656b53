//! System endpoints: health check and pool category catalog.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::app_state::AppState;

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
struct HealthResponse {
    status: String,
    timestamp: String,
    version: String,
}

/// `GET /health` — Service health status.
#[utoipa::path(
    get,
    path = "/health",
    tag = "System",
    summary = "Health check",
    description = "Returns service health status, version, and current timestamp.",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
    )
)]
pub async fn health_handler() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            timestamp: Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }),
    )
}

/// Pool category info.
#[derive(Debug, Serialize, ToSchema)]
struct PoolCategoryInfo {
    category: &'static str,
    description: &'static str,
}

/// `GET /config/pool-categories` — List pool categories.
#[utoipa::path(
    get,
    path = "/config/pool-categories",
    tag = "System",
    summary = "List pool categories",
    description = "Returns metadata for every pool category the gateway can create.",
    responses(
        (status = 200, description = "Category catalog", body = Vec<PoolCategoryInfo>),
    )
)]
pub async fn pool_categories_handler() -> impl IntoResponse {
    let categories = vec![
        PoolCategoryInfo {
            category: "standard",
            description: "Regular pools with moderate entry cost",
        },
        PoolCategoryInfo {
            category: "premium",
            description: "High entry cost, larger prize pools",
        },
        PoolCategoryInfo {
            category: "lightning",
            description: "Short deadlines, fast settlement",
        },
        PoolCategoryInfo {
            category: "tournament",
            description: "Long-running special events with many winners",
        },
    ];
    (StatusCode::OK, Json(categories))
}

/// System routes mounted at the root level (not under /api/v1).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_handler))
        .route("/config/pool-categories", get(pool_categories_handler))
}
