//! User handlers: registration, profile, ledger, purchases, leaderboard.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;

use crate::api::dto::{
    LeaderboardEntry, PurchasePointsRequest, RegisterUserRequest, TransactionDto, UserResponse,
};
use crate::app_state::AppState;
use crate::domain::UserId;
use crate::error::{ErrorResponse, GatewayError};

/// `POST /users` — Register a new user.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidRequest`] for an invalid or taken
/// username.
#[utoipa::path(
    post,
    path = "/api/v1/users",
    tag = "Users",
    summary = "Register a user",
    description = "Creates an account and credits the welcome bonus as the first ledger entry.",
    request_body = RegisterUserRequest,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Invalid or taken username", body = ErrorResponse),
    )
)]
pub async fn register_user(
    State(state): State<AppState>,
    Json(req): Json<RegisterUserRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let user = state.pool_service.register_user(&req.username).await?;
    Ok((StatusCode::CREATED, Json(UserResponse::from(&user))))
}

/// `GET /users/:id` — Get a user's profile.
///
/// # Errors
///
/// Returns [`GatewayError::UserNotFound`] for an unknown id.
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    tag = "Users",
    summary = "Get user profile",
    params(
        ("id" = uuid::Uuid, Path, description = "User UUID"),
    ),
    responses(
        (status = 200, description = "User profile", body = UserResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, GatewayError> {
    let user = state
        .pool_service
        .user_profile(UserId::from_uuid(id))
        .await?;
    Ok(Json(UserResponse::from(&user)))
}

/// `GET /users/:id/transactions` — Get a user's ledger, newest first.
///
/// # Errors
///
/// Returns [`GatewayError::UserNotFound`] for an unknown id.
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}/transactions",
    tag = "Users",
    summary = "Get user transactions",
    description = "Returns the user's append-only balance ledger, newest first.",
    params(
        ("id" = uuid::Uuid, Path, description = "User UUID"),
    ),
    responses(
        (status = 200, description = "Ledger entries", body = Vec<TransactionDto>),
        (status = 404, description = "User not found", body = ErrorResponse),
    )
)]
pub async fn get_transactions(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, GatewayError> {
    let transactions = state
        .pool_service
        .user_transactions(UserId::from_uuid(id))
        .await?;
    let data: Vec<TransactionDto> = transactions.iter().map(Into::into).collect();
    Ok(Json(data))
}

/// `POST /users/:id/points/purchase` — Credit a balance top-up.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidAmount`] for a non-positive amount or
/// [`GatewayError::UserNotFound`] for an unknown id.
#[utoipa::path(
    post,
    path = "/api/v1/users/{id}/points/purchase",
    tag = "Users",
    summary = "Purchase points",
    params(
        ("id" = uuid::Uuid, Path, description = "User UUID"),
    ),
    request_body = PurchasePointsRequest,
    responses(
        (status = 200, description = "Updated profile", body = UserResponse),
        (status = 400, description = "Non-positive amount", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
    )
)]
pub async fn purchase_points(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<PurchasePointsRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let user = state
        .pool_service
        .purchase_points(UserId::from_uuid(id), req.amount)
        .await?;
    Ok(Json(UserResponse::from(&user)))
}

/// Query parameters for the leaderboard.
#[derive(Debug, Deserialize)]
pub struct LeaderboardParams {
    /// Maximum rows to return (1-100, default 10).
    #[serde(default = "default_leaderboard_limit")]
    pub limit: usize,
}

fn default_leaderboard_limit() -> usize {
    10
}

/// `GET /leaderboard` — Top users by lifetime earnings.
///
/// # Errors
///
/// Returns [`GatewayError::Internal`] on storage failure.
#[utoipa::path(
    get,
    path = "/api/v1/leaderboard",
    tag = "Users",
    summary = "Earnings leaderboard",
    params(
        ("limit" = Option<usize>, Query, description = "Maximum rows (1-100, default 10)"),
    ),
    responses(
        (status = 200, description = "Ranked users", body = Vec<LeaderboardEntry>),
    )
)]
pub async fn leaderboard(
    State(state): State<AppState>,
    Query(params): Query<LeaderboardParams>,
) -> Result<impl IntoResponse, GatewayError> {
    let limit = params.limit.clamp(1, 100);
    let users = state.pool_service.leaderboard(limit).await?;
    let data: Vec<LeaderboardEntry> = users
        .iter()
        .enumerate()
        .map(|(index, user)| LeaderboardEntry {
            rank: index as u32 + 1,
            id: user.id,
            username: user.username.clone(),
            total_wins: user.total_wins,
            total_earnings: user.total_earnings,
        })
        .collect();
    Ok(Json(data))
}

/// User and leaderboard routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", post(register_user))
        .route("/users/{id}", get(get_user))
        .route("/users/{id}/transactions", get(get_transactions))
        .route("/users/{id}/points/purchase", post(purchase_points))
        .route("/leaderboard", get(leaderboard))
}
