//! Repository abstraction over user, pool, and ledger storage.
//!
//! The settlement engine depends only on the [`Repository`] trait; the
//! storage technology behind it is interchangeable. Every method is a
//! single atomic operation and must be callable from inside a held
//! per-pool critical section without re-entering the synchronizer.
//! [`memory::MemoryRepository`] is the in-process implementation.

pub mod memory;

pub use memory::MemoryRepository;

use crate::domain::{
    NewPool, NewTransaction, Participant, Pool, PoolId, PoolResult, PoolStatus, Transaction, User,
    UserId,
};
use crate::error::GatewayError;
use chrono::{DateTime, Utc};

/// Atomic delta applied to a user's balance and lifetime stats.
///
/// The points component is a *conditional* debit/credit: a debit that
/// would drive the balance negative is rejected as a whole, leaving the
/// user untouched. This is the backstop against two pools racing to
/// debit the same user.
#[derive(Debug, Clone, Copy, Default)]
pub struct UserDelta {
    /// Signed points change. Negative debits are rejected when the
    /// balance does not cover them.
    pub points: i64,
    /// Increment to `total_wins`.
    pub total_wins: u64,
    /// Increment to `total_games`.
    pub total_games: u64,
    /// Increment to `total_earnings`.
    pub total_earnings: u64,
}

impl UserDelta {
    /// Delta for joining a pool: debit the stake, count the game.
    #[must_use]
    pub fn stake(entry_cost: u64) -> Self {
        Self {
            points: -to_signed(entry_cost),
            total_games: 1,
            ..Self::default()
        }
    }

    /// Delta for winning a pool: credit the prize, count the win.
    #[must_use]
    pub fn prize(amount: u64) -> Self {
        Self {
            points: to_signed(amount),
            total_wins: 1,
            total_earnings: amount,
            ..Self::default()
        }
    }

    /// Delta for a plain credit (purchase or bonus).
    #[must_use]
    pub fn credit(amount: u64) -> Self {
        Self {
            points: to_signed(amount),
            ..Self::default()
        }
    }
}

/// Clamping conversion for ledger amounts; balances this large do not
/// occur in practice.
fn to_signed(amount: u64) -> i64 {
    i64::try_from(amount).unwrap_or(i64::MAX)
}

/// Partial update of a pool's engine-owned fields.
///
/// Only meaningful while the caller holds the pool's lock; the engine is
/// the sole writer of these fields.
#[derive(Debug, Clone, Copy, Default)]
pub struct PoolPatch {
    /// New participant count.
    pub current_players: Option<u32>,
    /// New accumulated stake.
    pub prize_pool: Option<u64>,
    /// New lifecycle status.
    pub status: Option<PoolStatus>,
    /// Settlement timestamp.
    pub completed_at: Option<DateTime<Utc>>,
}

/// Storage contract for users, pools, participants, results, and the
/// transaction ledger.
///
/// Implementations must make each method atomic with respect to every
/// other method and must never block on the per-pool synchronizer.
#[allow(async_fn_in_trait)] // only generic callers; no dyn use
pub trait Repository: Send + Sync + 'static {
    /// Creates a user with a zero balance and fresh stats.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidRequest`] if the username is taken.
    async fn create_user(&self, username: &str) -> Result<User, GatewayError>;

    /// Fetches a user by id.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Internal`] on storage failure.
    async fn get_user(&self, id: UserId) -> Result<Option<User>, GatewayError>;

    /// Atomically applies a [`UserDelta`], returning the updated user.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::UserNotFound`] for an unknown id and
    /// [`GatewayError::InsufficientFunds`] when a debit exceeds the
    /// balance; in both cases no state changes.
    async fn update_user(&self, id: UserId, delta: UserDelta) -> Result<User, GatewayError>;

    /// Returns the top users by `total_earnings`, descending.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Internal`] on storage failure.
    async fn top_users_by_earnings(&self, limit: usize) -> Result<Vec<User>, GatewayError>;

    /// Creates an active pool with zero counters.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Internal`] on storage failure.
    async fn create_pool(&self, new: NewPool) -> Result<Pool, GatewayError>;

    /// Fetches a pool by id.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Internal`] on storage failure.
    async fn get_pool(&self, id: PoolId) -> Result<Option<Pool>, GatewayError>;

    /// Applies a [`PoolPatch`], returning the updated pool.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PoolNotFound`] for an unknown id.
    async fn update_pool(&self, id: PoolId, patch: PoolPatch) -> Result<Pool, GatewayError>;

    /// Returns all pools, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Internal`] on storage failure.
    async fn list_pools(&self) -> Result<Vec<Pool>, GatewayError>;

    /// Records a user's entry in a pool.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Internal`] on storage failure.
    async fn create_participant(
        &self,
        pool_id: PoolId,
        user_id: UserId,
    ) -> Result<Participant, GatewayError>;

    /// Returns all entries for a pool in join order.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Internal`] on storage failure.
    async fn participants_for_pool(&self, pool_id: PoolId)
    -> Result<Vec<Participant>, GatewayError>;

    /// Returns `true` if the user already holds an entry in the pool.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Internal`] on storage failure.
    async fn is_participant(&self, pool_id: PoolId, user_id: UserId)
    -> Result<bool, GatewayError>;

    /// Records one winner's share of a settled pool.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Internal`] on storage failure.
    async fn create_result(&self, result: PoolResult) -> Result<(), GatewayError>;

    /// Returns all results for a pool in position order.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Internal`] on storage failure.
    async fn results_for_pool(&self, pool_id: PoolId) -> Result<Vec<PoolResult>, GatewayError>;

    /// Appends a ledger entry.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Internal`] on storage failure.
    async fn create_transaction(&self, new: NewTransaction)
    -> Result<Transaction, GatewayError>;

    /// Returns a user's ledger entries, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Internal`] on storage failure.
    async fn transactions_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<Transaction>, GatewayError>;
}
