//! Gateway error types with HTTP status code mapping.
//!
//! [`GatewayError`] is the central error type for the gateway. Domain
//! rejections (pool full, already joined, …) are expected and recoverable
//! by the caller; each maps to a specific HTTP status code and structured
//! JSON error response. [`GatewayError::Internal`] is reserved for
//! infrastructure failures and never represents a domain rejection.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::domain::{PoolId, UserId};

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 4002,
///     "message": "pool is full",
///     "details": null
///   }
/// }
/// ```
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    /// Numeric error code (see code ranges below).
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category         | HTTP Status                  |
/// |-----------|------------------|------------------------------|
/// | 1000–1999 | Validation       | 400 Bad Request              |
/// | 2000–2999 | Not Found        | 404 Not Found                |
/// | 3000–3999 | Server           | 500 Internal Server Error    |
/// | 4000–4999 | Domain Rejection | 409 Conflict / 422 Unproc.   |
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The pool does not exist or is no longer accepting joins.
    #[error("pool not available")]
    PoolUnavailable,

    /// The pool has reached its maximum number of players.
    #[error("pool is full")]
    PoolFull,

    /// The user already holds an entry in this pool.
    #[error("already joined this pool")]
    AlreadyJoined,

    /// The user's balance does not cover the required amount.
    #[error("insufficient points")]
    InsufficientFunds,

    /// Pool with the given ID was not found.
    #[error("pool not found: {0}")]
    PoolNotFound(PoolId),

    /// User with the given ID was not found.
    #[error("user not found: {0}")]
    UserNotFound(UserId),

    /// A points amount was zero or negative where a positive amount is required.
    #[error("invalid amount: {0}")]
    InvalidAmount(i64),

    /// Request validation failed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Internal server error (infrastructure, never a domain rejection).
    #[error("internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1001,
            Self::InvalidAmount(_) => 1002,
            Self::PoolNotFound(_) => 2001,
            Self::UserNotFound(_) => 2002,
            Self::PoolUnavailable => 4001,
            Self::PoolFull => 4002,
            Self::AlreadyJoined => 4003,
            Self::InsufficientFunds => 4004,
            Self::Internal(_) => 3000,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) | Self::InvalidAmount(_) => StatusCode::BAD_REQUEST,
            Self::PoolNotFound(_) | Self::UserNotFound(_) => StatusCode::NOT_FOUND,
            Self::PoolUnavailable | Self::PoolFull | Self::AlreadyJoined => StatusCode::CONFLICT,
            Self::InsufficientFunds => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: None,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}
