//! Core domain entities: users, pools, participants, results, transactions.
//!
//! The settlement engine is the sole writer of `Pool.current_players`,
//! `Pool.prize_pool`, `Pool.status`, `Pool.completed_at` and of
//! `User.points` / `total_wins` / `total_games` / `total_earnings`; every
//! other component only reads these fields.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{PoolId, UserId};

/// Lifecycle state of a pool.
///
/// The only transitions are `Active → Completed` and `Active → Cancelled`,
/// each at most once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PoolStatus {
    /// Accepting joins; counted by the expiry sweeper.
    Active,
    /// Settled; winners selected and prizes paid.
    Completed,
    /// Closed without settlement.
    Cancelled,
}

/// Display category of a pool.
///
/// Affects presentation and upstream winner-count policy only; the engine
/// invariants are identical for every category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PoolCategory {
    /// Regular pool.
    #[default]
    Standard,
    /// High entry cost, larger prizes.
    Premium,
    /// Short-lived speed pool.
    Lightning,
    /// Long-running special event.
    Tournament,
}

/// A user account with points balance and lifetime stats.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    /// Unique user identifier.
    pub id: UserId,
    /// Display name, unique across users.
    pub username: String,
    /// Current points balance. Never negative by construction.
    pub points: u64,
    /// Number of pools won.
    pub total_wins: u64,
    /// Number of pools entered.
    pub total_games: u64,
    /// Cumulative prize points received.
    pub total_earnings: u64,
    /// Consecutive-day login count.
    pub login_streak: u32,
    /// Timestamp of the most recent login.
    pub last_login: Option<DateTime<Utc>>,
    /// Account creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// A timed, capacity-bounded stake-and-win pool.
///
/// While a pool is `Active`, `prize_pool == current_players * entry_cost`
/// and `current_players <= max_players` hold at every quiescent point.
#[derive(Debug, Clone, Serialize)]
pub struct Pool {
    /// Unique pool identifier.
    pub id: PoolId,
    /// Human-readable pool name.
    pub name: String,
    /// Short description shown to players.
    pub description: String,
    /// Points staked per entry. Always positive.
    pub entry_cost: u64,
    /// Capacity: maximum number of participants.
    pub max_players: u32,
    /// Number of participants so far.
    pub current_players: u32,
    /// Accumulated stakes, pre-fee.
    pub prize_pool: u64,
    /// Number of winners selected at settlement.
    pub winner_count: u32,
    /// Display category.
    pub category: PoolCategory,
    /// Lifecycle state.
    pub status: PoolStatus,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Deadline after which the pool settles regardless of fill.
    pub ends_at: DateTime<Utc>,
    /// Settlement timestamp. Set iff `status == Completed`.
    pub completed_at: Option<DateTime<Utc>>,
}

impl Pool {
    /// Returns `true` if the pool is accepting joins.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == PoolStatus::Active
    }

    /// Returns `true` if the pool has reached capacity.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.current_players >= self.max_players
    }

    /// Returns `true` if the deadline has passed at `now`.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.ends_at
    }
}

/// Parameters for creating a new pool.
#[derive(Debug, Clone)]
pub struct NewPool {
    /// Human-readable pool name.
    pub name: String,
    /// Short description shown to players.
    pub description: String,
    /// Points staked per entry.
    pub entry_cost: u64,
    /// Capacity.
    pub max_players: u32,
    /// Number of winners selected at settlement.
    pub winner_count: u32,
    /// Display category.
    pub category: PoolCategory,
    /// Settlement deadline.
    pub ends_at: DateTime<Utc>,
}

/// A user's single entry in a specific pool.
///
/// At most one participant exists per `(pool_id, user_id)` pair; the
/// engine enforces this, not the store.
#[derive(Debug, Clone, Serialize)]
pub struct Participant {
    /// Pool the entry belongs to.
    pub pool_id: PoolId,
    /// User who staked.
    pub user_id: UserId,
    /// Entry timestamp.
    pub joined_at: DateTime<Utc>,
}

/// One winner's share of a settled pool.
#[derive(Debug, Clone, Serialize)]
pub struct PoolResult {
    /// Pool that was settled.
    pub pool_id: PoolId,
    /// Winning user.
    pub winner_id: UserId,
    /// Prize points paid to this winner.
    pub prize_amount: u64,
    /// 1-based rank in selection order. Carries no prize-size meaning.
    pub position: u32,
    /// Settlement timestamp.
    pub created_at: DateTime<Utc>,
}

/// Reason for a balance change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    /// Stake debited on joining a pool.
    Join,
    /// Prize credited at settlement.
    Win,
    /// Balance top-up.
    Purchase,
    /// Promotional grant (e.g. welcome bonus).
    Bonus,
}

/// One entry in the append-only balance ledger.
///
/// Never mutated or deleted. At any quiescent point the sum of a user's
/// transaction amounts equals their points balance.
#[derive(Debug, Clone, Serialize)]
pub struct Transaction {
    /// Unique ledger entry identifier.
    pub id: uuid::Uuid,
    /// User whose balance changed.
    pub user_id: UserId,
    /// Reason for the change.
    pub kind: TransactionKind,
    /// Signed amount: positive for credits, negative for debits.
    pub amount: i64,
    /// Human-readable description.
    pub description: String,
    /// Pool involved, when the change relates to one.
    pub pool_id: Option<PoolId>,
    /// Ledger entry timestamp.
    pub created_at: DateTime<Utc>,
}

/// Parameters for appending a ledger entry.
#[derive(Debug, Clone)]
pub struct NewTransaction {
    /// User whose balance changed.
    pub user_id: UserId,
    /// Reason for the change.
    pub kind: TransactionKind,
    /// Signed amount.
    pub amount: i64,
    /// Human-readable description.
    pub description: String,
    /// Pool involved, if any.
    pub pool_id: Option<PoolId>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn make_pool(current: u32, max: u32) -> Pool {
        let now = Utc::now();
        Pool {
            id: PoolId::new(),
            name: "Quick Draw".to_string(),
            description: "fast pool".to_string(),
            entry_cost: 100,
            max_players: max,
            current_players: current,
            prize_pool: u64::from(current) * 100,
            winner_count: 1,
            category: PoolCategory::Standard,
            status: PoolStatus::Active,
            created_at: now,
            ends_at: now + Duration::minutes(5),
            completed_at: None,
        }
    }

    #[test]
    fn full_at_capacity() {
        assert!(!make_pool(1, 2).is_full());
        assert!(make_pool(2, 2).is_full());
    }

    #[test]
    fn expired_at_and_after_deadline() {
        let pool = make_pool(0, 2);
        assert!(!pool.is_expired(pool.ends_at - Duration::seconds(1)));
        assert!(pool.is_expired(pool.ends_at));
        assert!(pool.is_expired(pool.ends_at + Duration::seconds(1)));
    }

    #[test]
    fn status_serializes_snake_case() {
        let json = serde_json::to_string(&PoolStatus::Active).unwrap_or_default();
        assert_eq!(json, "\"active\"");
        let json = serde_json::to_string(&TransactionKind::Purchase).unwrap_or_default();
        assert_eq!(json, "\"purchase\"");
    }
}
