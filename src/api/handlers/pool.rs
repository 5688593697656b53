//! Pool handlers: create, list, get, join.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{CreatePoolRequest, JoinPoolRequest, PoolDetailResponse, PoolResponse};
use crate::app_state::AppState;
use crate::domain::{NewPool, PoolId};
use crate::error::{ErrorResponse, GatewayError};

/// `POST /pools` — Open a new prize pool.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidRequest`] on inconsistent parameters.
#[utoipa::path(
    post,
    path = "/api/v1/pools",
    tag = "Pools",
    summary = "Create a new prize pool",
    description = "Opens a pool that accepts joins until it fills or its deadline passes, then settles automatically.",
    request_body = CreatePoolRequest,
    responses(
        (status = 201, description = "Pool created", body = PoolResponse),
        (status = 400, description = "Invalid pool parameters", body = ErrorResponse),
    )
)]
pub async fn create_pool(
    State(state): State<AppState>,
    Json(req): Json<CreatePoolRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let pool = state
        .pool_service
        .create_pool(NewPool {
            name: req.name,
            description: req.description,
            entry_cost: req.entry_cost,
            max_players: req.max_players,
            winner_count: req.winner_count,
            category: req.category,
            ends_at: req.ends_at,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(PoolResponse::from(&pool))))
}

/// `GET /pools` — List pools currently accepting joins.
///
/// # Errors
///
/// Returns [`GatewayError::Internal`] on storage failure.
#[utoipa::path(
    get,
    path = "/api/v1/pools",
    tag = "Pools",
    summary = "List active pools",
    description = "Returns every pool currently accepting joins, newest first.",
    responses(
        (status = 200, description = "Active pools", body = Vec<PoolResponse>),
    )
)]
pub async fn list_pools(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, GatewayError> {
    let pools = state.pool_service.list_active_pools().await?;
    let data: Vec<PoolResponse> = pools.iter().map(PoolResponse::from).collect();
    Ok(Json(data))
}

/// `GET /pools/:id` — Get one pool with participants and results.
///
/// # Errors
///
/// Returns [`GatewayError::PoolNotFound`] for an unknown id.
#[utoipa::path(
    get,
    path = "/api/v1/pools/{id}",
    tag = "Pools",
    summary = "Get pool details",
    description = "Returns the pool, its participants in join order, and winner results once settled.",
    params(
        ("id" = uuid::Uuid, Path, description = "Pool UUID"),
    ),
    responses(
        (status = 200, description = "Pool details", body = PoolDetailResponse),
        (status = 404, description = "Pool not found", body = ErrorResponse),
    )
)]
pub async fn get_pool(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, GatewayError> {
    let detail = state.pool_service.pool_detail(PoolId::from_uuid(id)).await?;
    Ok(Json(PoolDetailResponse {
        pool: PoolResponse::from(&detail.pool),
        participants: detail.participants.iter().map(Into::into).collect(),
        results: detail.results.iter().map(Into::into).collect(),
    }))
}

/// `POST /pools/:id/join` — Stake into a pool.
///
/// # Errors
///
/// Returns [`GatewayError::PoolUnavailable`], [`GatewayError::PoolFull`],
/// [`GatewayError::AlreadyJoined`], [`GatewayError::InsufficientFunds`],
/// or [`GatewayError::UserNotFound`].
#[utoipa::path(
    post,
    path = "/api/v1/pools/{id}/join",
    tag = "Pools",
    summary = "Join a pool",
    description = "Debits the entry cost and takes a seat. If the join fills the pool it settles immediately and the returned pool is completed.",
    params(
        ("id" = uuid::Uuid, Path, description = "Pool UUID"),
    ),
    request_body = JoinPoolRequest,
    responses(
        (status = 200, description = "Joined; pool snapshot after the join", body = PoolResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 409, description = "Pool unavailable, full, or already joined", body = ErrorResponse),
        (status = 422, description = "Balance below entry cost", body = ErrorResponse),
    )
)]
pub async fn join_pool(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<JoinPoolRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let pool = state
        .pool_service
        .join_pool(req.user_id, PoolId::from_uuid(id))
        .await?;
    Ok(Json(PoolResponse::from(&pool)))
}

/// Pool routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/pools", post(create_pool).get(list_pools))
        .route("/pools/{id}", get(get_pool))
        .route("/pools/{id}/join", post(join_pool))
}
