//! Pool lifecycle and settlement engine.
//!
//! [`PoolService`] owns every state transition: join-time invariant
//! checks, the completion decision, winner selection, prize computation,
//! and ledger recording. All mutations of a pool happen under that
//! pool's entry in [`PoolLocks`], and settlement runs inline in whichever
//! synchronized context first observes a completion condition — a filling
//! join or the expiry sweep. Events are published through the
//! [`EventBus`] only after the lock is released.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::rng::RandomSource;
use crate::domain::{
    EventBus, NewPool, NewTransaction, Participant, Pool, PoolEvent, PoolId, PoolLocks,
    PoolResult, PoolStatus, Transaction, TransactionKind, User, UserId,
};
use crate::error::GatewayError;
use crate::repo::{PoolPatch, Repository, UserDelta};

/// Share of the prize pool distributed to winners; the remaining 10% is
/// the platform fee, retained together with division remainders.
const WINNER_SHARE_PERCENT: u128 = 90;

/// Everything a caller needs to know about a finished pool: the pool
/// itself, its participants, and (once settled) the winner results.
#[derive(Debug, Clone)]
pub struct PoolDetail {
    /// The pool snapshot.
    pub pool: Pool,
    /// Entries in join order.
    pub participants: Vec<Participant>,
    /// Winner results in position order; empty while the pool is active.
    pub results: Vec<PoolResult>,
}

/// Result of one settlement: the completed pool and the selected winners.
#[derive(Debug)]
struct SettlementOutcome {
    pool: Pool,
    winner_ids: Vec<UserId>,
    completed_at: DateTime<Utc>,
}

/// Orchestration layer for all pool and balance operations.
///
/// Every mutation method follows the pattern: acquire the pool lock →
/// re-check status → mutate through the repository → release the lock →
/// emit events from a snapshot.
#[derive(Debug)]
pub struct PoolService<R> {
    repo: Arc<R>,
    locks: PoolLocks,
    event_bus: EventBus,
    rng: Arc<dyn RandomSource>,
    welcome_bonus: u64,
}

impl<R: Repository> PoolService<R> {
    /// Creates a new `PoolService`.
    #[must_use]
    pub fn new(
        repo: Arc<R>,
        event_bus: EventBus,
        rng: Arc<dyn RandomSource>,
        welcome_bonus: u64,
    ) -> Self {
        Self {
            repo,
            locks: PoolLocks::new(),
            event_bus,
            rng,
            welcome_bonus,
        }
    }

    /// Returns a reference to the inner [`EventBus`].
    #[must_use]
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    /// Returns a reference to the underlying repository.
    #[must_use]
    pub fn repo(&self) -> &Arc<R> {
        &self.repo
    }

    /// Registers a new user and credits the welcome grant.
    ///
    /// The grant is booked as a [`TransactionKind::Bonus`] ledger entry,
    /// so a fresh account's balance already equals the sum of its
    /// transactions.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidRequest`] for an empty, overlong,
    /// or already-taken username.
    pub async fn register_user(&self, username: &str) -> Result<User, GatewayError> {
        let username = username.trim();
        if username.is_empty() || username.len() > 32 {
            return Err(GatewayError::InvalidRequest(
                "username must be 1-32 characters".to_string(),
            ));
        }

        let mut user = self.repo.create_user(username).await?;
        if self.welcome_bonus > 0 {
            user = self
                .repo
                .update_user(user.id, UserDelta::credit(self.welcome_bonus))
                .await?;
            self.repo
                .create_transaction(NewTransaction {
                    user_id: user.id,
                    kind: TransactionKind::Bonus,
                    amount: signed(self.welcome_bonus),
                    description: "Welcome bonus".to_string(),
                    pool_id: None,
                })
                .await?;
        }

        tracing::info!(user_id = %user.id, username = %user.username, "user registered");
        Ok(user)
    }

    /// Opens a new pool and emits a `pool_created` event.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidRequest`] when the parameters are
    /// inconsistent (zero entry cost, fewer than two seats, winner count
    /// outside `1..=max_players`, or a deadline in the past).
    pub async fn create_pool(&self, new: NewPool) -> Result<Pool, GatewayError> {
        if new.name.trim().is_empty() {
            return Err(GatewayError::InvalidRequest(
                "pool name must not be empty".to_string(),
            ));
        }
        if new.entry_cost == 0 {
            return Err(GatewayError::InvalidRequest(
                "entry cost must be positive".to_string(),
            ));
        }
        if new.max_players < 2 {
            return Err(GatewayError::InvalidRequest(
                "pool needs at least two seats".to_string(),
            ));
        }
        if new.winner_count == 0 || new.winner_count > new.max_players {
            return Err(GatewayError::InvalidRequest(
                "winner count must be between 1 and max players".to_string(),
            ));
        }
        if new.ends_at <= Utc::now() {
            return Err(GatewayError::InvalidRequest(
                "deadline must be in the future".to_string(),
            ));
        }

        let pool = self.repo.create_pool(new).await?;
        tracing::info!(pool_id = %pool.id, name = %pool.name, "pool created");
        self.event_bus.publish(PoolEvent::PoolCreated {
            pool: pool.clone(),
            timestamp: Utc::now(),
        });
        Ok(pool)
    }

    /// Stakes `user_id` into `pool_id`.
    ///
    /// Preconditions are checked inside the pool's critical section, in
    /// order: pool exists and is active, pool has a free seat, user has
    /// no existing entry, balance covers the stake. On success the stake
    /// is debited, the entry recorded, the pool counters advanced, and a
    /// `join` ledger entry appended. If the join fills the pool or the
    /// deadline has passed, settlement runs before the lock is released,
    /// so no other join or sweep can observe a just-full unsettled pool.
    ///
    /// # Errors
    ///
    /// [`GatewayError::PoolUnavailable`], [`GatewayError::PoolFull`],
    /// [`GatewayError::AlreadyJoined`], [`GatewayError::InsufficientFunds`],
    /// or [`GatewayError::UserNotFound`]. Rejections leave all state
    /// unchanged.
    pub async fn join_pool(&self, user_id: UserId, pool_id: PoolId) -> Result<Pool, GatewayError> {
        let guard = self.locks.acquire(pool_id).await;

        let pool = self
            .repo
            .get_pool(pool_id)
            .await?
            .ok_or(GatewayError::PoolUnavailable)?;
        if !pool.is_active() {
            return Err(GatewayError::PoolUnavailable);
        }
        if pool.is_full() {
            return Err(GatewayError::PoolFull);
        }
        if self.repo.is_participant(pool_id, user_id).await? {
            return Err(GatewayError::AlreadyJoined);
        }
        let user = self
            .repo
            .get_user(user_id)
            .await?
            .ok_or(GatewayError::UserNotFound(user_id))?;
        if user.points < pool.entry_cost {
            return Err(GatewayError::InsufficientFunds);
        }

        // The debit comes first: it is an atomic check-and-debit, and no
        // later step in this section can fail, so a rejection never
        // leaves a partial write behind.
        self.repo
            .update_user(user_id, UserDelta::stake(pool.entry_cost))
            .await?;
        self.repo.create_participant(pool_id, user_id).await?;
        let updated = self
            .repo
            .update_pool(
                pool_id,
                PoolPatch {
                    current_players: Some(pool.current_players + 1),
                    prize_pool: Some(pool.prize_pool + pool.entry_cost),
                    ..PoolPatch::default()
                },
            )
            .await?;
        self.repo
            .create_transaction(NewTransaction {
                user_id,
                kind: TransactionKind::Join,
                amount: -signed(updated.entry_cost),
                description: format!("Joined {}", updated.name),
                pool_id: Some(pool_id),
            })
            .await?;

        tracing::debug!(%pool_id, %user_id, players = updated.current_players, "user joined pool");

        let outcome = if updated.is_full() || updated.is_expired(Utc::now()) {
            self.settle_locked(pool_id).await?
        } else {
            None
        };

        let snapshot = match &outcome {
            Some(outcome) => outcome.pool.clone(),
            None => updated,
        };
        drop(guard);

        self.event_bus.publish(PoolEvent::PoolUpdated {
            pool: snapshot.clone(),
            timestamp: Utc::now(),
        });
        if let Some(outcome) = outcome {
            self.publish_completion(outcome);
        }
        Ok(snapshot)
    }

    /// Credits a balance top-up and appends a `purchase` ledger entry.
    ///
    /// No pool interaction; the repository's atomic user update is the
    /// only synchronization needed.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidAmount`] for a non-positive amount
    /// (no state change) or [`GatewayError::UserNotFound`].
    pub async fn purchase_points(&self, user_id: UserId, amount: i64) -> Result<User, GatewayError> {
        if amount <= 0 {
            return Err(GatewayError::InvalidAmount(amount));
        }
        let user = self
            .repo
            .update_user(user_id, UserDelta::credit(amount.unsigned_abs()))
            .await?;
        self.repo
            .create_transaction(NewTransaction {
                user_id,
                kind: TransactionKind::Purchase,
                amount,
                description: format!("Purchased {amount} points"),
                pool_id: None,
            })
            .await?;
        tracing::debug!(%user_id, amount, balance = user.points, "points purchased");
        Ok(user)
    }

    /// Settles every active pool whose deadline has passed.
    ///
    /// This is the sweep path: it goes through the same per-pool lock as
    /// join-triggered settlement, so a pool racing both triggers settles
    /// exactly once. Returns the number of pools settled by this call.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Internal`] on repository failure.
    pub async fn settle_expired(&self) -> Result<usize, GatewayError> {
        let now = Utc::now();
        let pools = self.repo.list_pools().await?;
        let mut settled = 0;
        for pool in pools
            .into_iter()
            .filter(|p| p.is_active() && p.is_expired(now))
        {
            let outcome = {
                let _guard = self.locks.acquire(pool.id).await;
                // Status may have changed while we waited for the lock;
                // settle_locked re-checks and no-ops on a settled pool.
                self.settle_locked(pool.id).await?
            };
            if let Some(outcome) = outcome {
                settled += 1;
                self.publish_completion(outcome);
            }
        }
        Ok(settled)
    }

    /// Closes the pool and pays out winners. Caller must hold the pool's
    /// lock. Returns `None` when the pool is missing or already settled.
    async fn settle_locked(
        &self,
        pool_id: PoolId,
    ) -> Result<Option<SettlementOutcome>, GatewayError> {
        let Some(pool) = self.repo.get_pool(pool_id).await? else {
            return Ok(None);
        };
        if !pool.is_active() {
            return Ok(None);
        }

        // The status flip is the first write: once visible, every repeated
        // settlement request is a guaranteed no-op, before any payout
        // side effect can be observed.
        let completed_at = Utc::now();
        let pool = self
            .repo
            .update_pool(
                pool_id,
                PoolPatch {
                    status: Some(PoolStatus::Completed),
                    completed_at: Some(completed_at),
                    ..PoolPatch::default()
                },
            )
            .await?;

        let participants = self.repo.participants_for_pool(pool_id).await?;
        let winners_count = usize::min(pool.winner_count as usize, participants.len());

        let winner_ids = if winners_count == 0 {
            // A pool nobody joined still completes, so its lifecycle
            // terminates instead of being rechecked by the sweeper forever.
            Vec::new()
        } else {
            let order = self.rng.permutation(participants.len());
            let selected: Vec<&Participant> = order
                .iter()
                .take(winners_count)
                .filter_map(|&index| participants.get(index))
                .collect();
            let per_winner = distributable_prize(pool.prize_pool) / winners_count as u64;

            for (index, participant) in selected.iter().enumerate() {
                let position = index as u32 + 1;
                if let Err(error) = self
                    .pay_winner(&pool, participant.user_id, per_winner, position)
                    .await
                {
                    // The unpaid share is retained, not redistributed.
                    tracing::warn!(
                        %pool_id,
                        winner = %participant.user_id,
                        %error,
                        "skipping winner payout"
                    );
                }
            }
            selected.iter().map(|p| p.user_id).collect()
        };

        tracing::info!(
            %pool_id,
            players = pool.current_players,
            winners = winner_ids.len(),
            prize_pool = pool.prize_pool,
            "pool settled"
        );
        Ok(Some(SettlementOutcome {
            pool,
            winner_ids,
            completed_at,
        }))
    }

    /// Pays one winner: balance, stats, result row, ledger entry.
    async fn pay_winner(
        &self,
        pool: &Pool,
        winner_id: UserId,
        prize: u64,
        position: u32,
    ) -> Result<(), GatewayError> {
        self.repo
            .update_user(winner_id, UserDelta::prize(prize))
            .await?;
        self.repo
            .create_result(PoolResult {
                pool_id: pool.id,
                winner_id,
                prize_amount: prize,
                position,
                created_at: Utc::now(),
            })
            .await?;
        self.repo
            .create_transaction(NewTransaction {
                user_id: winner_id,
                kind: TransactionKind::Win,
                amount: signed(prize),
                description: format!("Won {}", pool.name),
                pool_id: Some(pool.id),
            })
            .await?;
        Ok(())
    }

    fn publish_completion(&self, outcome: SettlementOutcome) {
        self.event_bus.publish(PoolEvent::PoolCompleted {
            pool_id: outcome.pool.id,
            winner_ids: outcome.winner_ids,
            timestamp: outcome.completed_at,
        });
    }

    /// Returns all pools currently accepting joins, newest first.
    ///
    /// Lock-free read; the snapshot may be momentarily stale.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Internal`] on repository failure.
    pub async fn list_active_pools(&self) -> Result<Vec<Pool>, GatewayError> {
        let pools = self.repo.list_pools().await?;
        Ok(pools.into_iter().filter(Pool::is_active).collect())
    }

    /// Returns a pool with its participants and any winner results.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PoolNotFound`] for an unknown id.
    pub async fn pool_detail(&self, pool_id: PoolId) -> Result<PoolDetail, GatewayError> {
        let pool = self
            .repo
            .get_pool(pool_id)
            .await?
            .ok_or(GatewayError::PoolNotFound(pool_id))?;
        let participants = self.repo.participants_for_pool(pool_id).await?;
        let results = self.repo.results_for_pool(pool_id).await?;
        Ok(PoolDetail {
            pool,
            participants,
            results,
        })
    }

    /// Returns a user's profile.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::UserNotFound`] for an unknown id.
    pub async fn user_profile(&self, user_id: UserId) -> Result<User, GatewayError> {
        self.repo
            .get_user(user_id)
            .await?
            .ok_or(GatewayError::UserNotFound(user_id))
    }

    /// Returns a user's ledger entries, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::UserNotFound`] for an unknown id.
    pub async fn user_transactions(
        &self,
        user_id: UserId,
    ) -> Result<Vec<Transaction>, GatewayError> {
        if self.repo.get_user(user_id).await?.is_none() {
            return Err(GatewayError::UserNotFound(user_id));
        }
        self.repo.transactions_for_user(user_id).await
    }

    /// Returns the top `limit` users by lifetime earnings.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Internal`] on repository failure.
    pub async fn leaderboard(&self, limit: usize) -> Result<Vec<User>, GatewayError> {
        self.repo.top_users_by_earnings(limit).await
    }
}

/// Prize points available to winners: `floor(prize_pool * 0.9)`. The
/// remainder is the platform fee plus rounding, never refunded.
fn distributable_prize(prize_pool: u64) -> u64 {
    u64::try_from(u128::from(prize_pool) * WINNER_SHARE_PERCENT / 100).unwrap_or(u64::MAX)
}

/// Clamping conversion for ledger amounts.
fn signed(amount: u64) -> i64 {
    i64::try_from(amount).unwrap_or(i64::MAX)
}
