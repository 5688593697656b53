//! User, ledger, and leaderboard DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{PoolId, Transaction, TransactionKind, User, UserId};

/// Request body for `POST /users`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterUserRequest {
    /// Unique username, 1-32 characters.
    pub username: String,
}

/// Request body for `POST /users/:id/points/purchase`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct PurchasePointsRequest {
    /// Points to credit; must be positive.
    pub amount: i64,
}

/// User profile returned by user endpoints.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    /// User identifier.
    pub id: UserId,
    /// Username.
    pub username: String,
    /// Current spendable balance.
    pub points: u64,
    /// Lifetime pools won.
    pub total_wins: u64,
    /// Lifetime pools entered.
    pub total_games: u64,
    /// Lifetime prize points received.
    pub total_earnings: u64,
    /// Consecutive login days.
    pub login_streak: u32,
    /// Registration timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            points: user.points,
            total_wins: user.total_wins,
            total_games: user.total_games,
            total_earnings: user.total_earnings,
            login_streak: user.login_streak,
            created_at: user.created_at,
        }
    }
}

/// One ledger entry.
#[derive(Debug, Serialize, ToSchema)]
pub struct TransactionDto {
    /// Entry identifier.
    pub id: uuid::Uuid,
    /// Entry kind.
    pub kind: TransactionKind,
    /// Signed points change.
    pub amount: i64,
    /// Human-readable description.
    pub description: String,
    /// The pool involved, if any.
    pub pool_id: Option<PoolId>,
    /// Entry timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<&Transaction> for TransactionDto {
    fn from(t: &Transaction) -> Self {
        Self {
            id: t.id,
            kind: t.kind,
            amount: t.amount,
            description: t.description.clone(),
            pool_id: t.pool_id,
            created_at: t.created_at,
        }
    }
}

/// One row of the earnings leaderboard.
#[derive(Debug, Serialize, ToSchema)]
pub struct LeaderboardEntry {
    /// 1-based rank.
    pub rank: u32,
    /// User identifier.
    pub id: UserId,
    /// Username.
    pub username: String,
    /// Lifetime pools won.
    pub total_wins: u64,
    /// Lifetime prize points received.
    pub total_earnings: u64,
}
