//! Pool-related DTOs for create, join, get, and list operations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Participant, Pool, PoolCategory, PoolId, PoolResult, PoolStatus, UserId};

/// Request body for `POST /pools`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreatePoolRequest {
    /// Human-readable pool name.
    pub name: String,
    /// Optional description shown in listings.
    #[serde(default)]
    pub description: String,
    /// Stake in points required to enter.
    pub entry_cost: u64,
    /// Seat capacity.
    pub max_players: u32,
    /// How many winners share the prize pool.
    #[serde(default = "default_winner_count")]
    pub winner_count: u32,
    /// Pool category.
    #[serde(default)]
    pub category: PoolCategory,
    /// Join deadline.
    pub ends_at: DateTime<Utc>,
}

fn default_winner_count() -> u32 {
    1
}

/// Request body for `POST /pools/:id/join`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct JoinPoolRequest {
    /// The joining user.
    pub user_id: UserId,
}

/// Pool representation returned by every pool endpoint.
#[derive(Debug, Serialize, ToSchema)]
pub struct PoolResponse {
    /// Pool identifier.
    pub id: PoolId,
    /// Pool name.
    pub name: String,
    /// Pool description.
    pub description: String,
    /// Stake required to enter.
    pub entry_cost: u64,
    /// Seat capacity.
    pub max_players: u32,
    /// Seats taken so far.
    pub current_players: u32,
    /// Accumulated stakes.
    pub prize_pool: u64,
    /// Configured winner count.
    pub winner_count: u32,
    /// Pool category.
    pub category: PoolCategory,
    /// Lifecycle status.
    pub status: PoolStatus,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Join deadline.
    pub ends_at: DateTime<Utc>,
    /// Settlement timestamp, once completed.
    pub completed_at: Option<DateTime<Utc>>,
}

impl From<&Pool> for PoolResponse {
    fn from(pool: &Pool) -> Self {
        Self {
            id: pool.id,
            name: pool.name.clone(),
            description: pool.description.clone(),
            entry_cost: pool.entry_cost,
            max_players: pool.max_players,
            current_players: pool.current_players,
            prize_pool: pool.prize_pool,
            winner_count: pool.winner_count,
            category: pool.category,
            status: pool.status,
            created_at: pool.created_at,
            ends_at: pool.ends_at,
            completed_at: pool.completed_at,
        }
    }
}

/// One entry in a pool.
#[derive(Debug, Serialize, ToSchema)]
pub struct ParticipantDto {
    /// The entered user.
    pub user_id: UserId,
    /// Entry timestamp.
    pub joined_at: DateTime<Utc>,
}

impl From<&Participant> for ParticipantDto {
    fn from(p: &Participant) -> Self {
        Self {
            user_id: p.user_id,
            joined_at: p.joined_at,
        }
    }
}

/// One winner's share of a settled pool.
#[derive(Debug, Serialize, ToSchema)]
pub struct PoolResultDto {
    /// The winning user.
    pub winner_id: UserId,
    /// Points credited.
    pub prize_amount: u64,
    /// 1-based draw position.
    pub position: u32,
}

impl From<&PoolResult> for PoolResultDto {
    fn from(r: &PoolResult) -> Self {
        Self {
            winner_id: r.winner_id,
            prize_amount: r.prize_amount,
            position: r.position,
        }
    }
}

/// Response body for `GET /pools/:id`.
#[derive(Debug, Serialize, ToSchema)]
pub struct PoolDetailResponse {
    /// The pool itself.
    pub pool: PoolResponse,
    /// Entries in join order.
    pub participants: Vec<ParticipantDto>,
    /// Winner results; empty while the pool is active.
    pub results: Vec<PoolResultDto>,
}
