//! In-memory repository backed by `tokio::sync::RwLock` maps.
//!
//! Each entity family lives behind its own lock, so an operation on the
//! user table never contends with one on the participant table. Every
//! trait method takes a single write (or read) lock for its whole
//! duration, which makes the method atomic as the [`super::Repository`]
//! contract requires.

use std::collections::HashMap;

use chrono::Utc;
use tokio::sync::RwLock;

use super::{PoolPatch, Repository, UserDelta};
use crate::domain::{
    NewPool, NewTransaction, Participant, Pool, PoolId, PoolResult, PoolStatus, Transaction, User,
    UserId,
};
use crate::error::GatewayError;

/// In-process store for users, pools, participants, results, and the
/// transaction ledger.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    users: RwLock<HashMap<UserId, User>>,
    pools: RwLock<HashMap<PoolId, Pool>>,
    participants: RwLock<Vec<Participant>>,
    results: RwLock<Vec<PoolResult>>,
    transactions: RwLock<Vec<Transaction>>,
}

impl MemoryRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Repository for MemoryRepository {
    async fn create_user(&self, username: &str) -> Result<User, GatewayError> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.username == username) {
            return Err(GatewayError::InvalidRequest(format!(
                "username already taken: {username}"
            )));
        }
        let user = User {
            id: UserId::new(),
            username: username.to_string(),
            points: 0,
            total_wins: 0,
            total_games: 0,
            total_earnings: 0,
            login_streak: 1,
            last_login: Some(Utc::now()),
            created_at: Utc::now(),
        };
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>, GatewayError> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn update_user(&self, id: UserId, delta: UserDelta) -> Result<User, GatewayError> {
        let mut users = self.users.write().await;
        let user = users.get_mut(&id).ok_or(GatewayError::UserNotFound(id))?;

        // Conditional debit: reject the whole delta before touching anything.
        if delta.points < 0 {
            let debit = delta.points.unsigned_abs();
            if user.points < debit {
                return Err(GatewayError::InsufficientFunds);
            }
            user.points -= debit;
        } else {
            user.points = user.points.saturating_add(delta.points.unsigned_abs());
        }
        user.total_wins = user.total_wins.saturating_add(delta.total_wins);
        user.total_games = user.total_games.saturating_add(delta.total_games);
        user.total_earnings = user.total_earnings.saturating_add(delta.total_earnings);
        Ok(user.clone())
    }

    async fn top_users_by_earnings(&self, limit: usize) -> Result<Vec<User>, GatewayError> {
        let users = self.users.read().await;
        let mut ranked: Vec<User> = users.values().cloned().collect();
        ranked.sort_by(|a, b| b.total_earnings.cmp(&a.total_earnings));
        ranked.truncate(limit);
        Ok(ranked)
    }

    async fn create_pool(&self, new: NewPool) -> Result<Pool, GatewayError> {
        let pool = Pool {
            id: PoolId::new(),
            name: new.name,
            description: new.description,
            entry_cost: new.entry_cost,
            max_players: new.max_players,
            current_players: 0,
            prize_pool: 0,
            winner_count: new.winner_count,
            category: new.category,
            status: PoolStatus::Active,
            created_at: Utc::now(),
            ends_at: new.ends_at,
            completed_at: None,
        };
        self.pools.write().await.insert(pool.id, pool.clone());
        Ok(pool)
    }

    async fn get_pool(&self, id: PoolId) -> Result<Option<Pool>, GatewayError> {
        Ok(self.pools.read().await.get(&id).cloned())
    }

    async fn update_pool(&self, id: PoolId, patch: PoolPatch) -> Result<Pool, GatewayError> {
        let mut pools = self.pools.write().await;
        let pool = pools.get_mut(&id).ok_or(GatewayError::PoolNotFound(id))?;
        if let Some(current_players) = patch.current_players {
            pool.current_players = current_players;
        }
        if let Some(prize_pool) = patch.prize_pool {
            pool.prize_pool = prize_pool;
        }
        if let Some(status) = patch.status {
            pool.status = status;
        }
        if let Some(completed_at) = patch.completed_at {
            pool.completed_at = Some(completed_at);
        }
        Ok(pool.clone())
    }

    async fn list_pools(&self) -> Result<Vec<Pool>, GatewayError> {
        let pools = self.pools.read().await;
        let mut listed: Vec<Pool> = pools.values().cloned().collect();
        listed.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(listed)
    }

    async fn create_participant(
        &self,
        pool_id: PoolId,
        user_id: UserId,
    ) -> Result<Participant, GatewayError> {
        let participant = Participant {
            pool_id,
            user_id,
            joined_at: Utc::now(),
        };
        self.participants.write().await.push(participant.clone());
        Ok(participant)
    }

    async fn participants_for_pool(
        &self,
        pool_id: PoolId,
    ) -> Result<Vec<Participant>, GatewayError> {
        let participants = self.participants.read().await;
        Ok(participants
            .iter()
            .filter(|p| p.pool_id == pool_id)
            .cloned()
            .collect())
    }

    async fn is_participant(
        &self,
        pool_id: PoolId,
        user_id: UserId,
    ) -> Result<bool, GatewayError> {
        let participants = self.participants.read().await;
        Ok(participants
            .iter()
            .any(|p| p.pool_id == pool_id && p.user_id == user_id))
    }

    async fn create_result(&self, result: PoolResult) -> Result<(), GatewayError> {
        self.results.write().await.push(result);
        Ok(())
    }

    async fn results_for_pool(&self, pool_id: PoolId) -> Result<Vec<PoolResult>, GatewayError> {
        let results = self.results.read().await;
        let mut matched: Vec<PoolResult> = results
            .iter()
            .filter(|r| r.pool_id == pool_id)
            .cloned()
            .collect();
        matched.sort_by_key(|r| r.position);
        Ok(matched)
    }

    async fn create_transaction(
        &self,
        new: NewTransaction,
    ) -> Result<Transaction, GatewayError> {
        let transaction = Transaction {
            id: uuid::Uuid::new_v4(),
            user_id: new.user_id,
            kind: new.kind,
            amount: new.amount,
            description: new.description,
            pool_id: new.pool_id,
            created_at: Utc::now(),
        };
        self.transactions.write().await.push(transaction.clone());
        Ok(transaction)
    }

    async fn transactions_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<Transaction>, GatewayError> {
        let transactions = self.transactions.read().await;
        let mut matched: Vec<Transaction> = transactions
            .iter()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect();
        matched.reverse(); // append order -> newest first
        Ok(matched)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::{PoolCategory, TransactionKind};
    use chrono::Duration;

    fn make_new_pool() -> NewPool {
        NewPool {
            name: "Quick Draw Pool".to_string(),
            description: "Fast-paced 5-minute pool".to_string(),
            entry_cost: 100,
            max_players: 50,
            winner_count: 1,
            category: PoolCategory::Standard,
            ends_at: Utc::now() + Duration::minutes(5),
        }
    }

    #[tokio::test]
    async fn create_user_starts_with_zero_balance() {
        let repo = MemoryRepository::new();
        let Ok(user) = repo.create_user("alice").await else {
            panic!("create failed");
        };
        assert_eq!(user.points, 0);
        assert_eq!(user.total_games, 0);

        let Ok(Some(fetched)) = repo.get_user(user.id).await else {
            panic!("get failed");
        };
        assert_eq!(fetched.username, "alice");
    }

    #[tokio::test]
    async fn duplicate_username_rejected() {
        let repo = MemoryRepository::new();
        let Ok(_) = repo.create_user("alice").await else {
            panic!("create failed");
        };
        let result = repo.create_user("alice").await;
        assert!(matches!(result, Err(GatewayError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn update_user_applies_delta() {
        let repo = MemoryRepository::new();
        let Ok(user) = repo.create_user("bob").await else {
            panic!("create failed");
        };
        let Ok(user) = repo.update_user(user.id, UserDelta::credit(1000)).await else {
            panic!("credit failed");
        };
        assert_eq!(user.points, 1000);

        let Ok(user) = repo.update_user(user.id, UserDelta::stake(100)).await else {
            panic!("stake failed");
        };
        assert_eq!(user.points, 900);
        assert_eq!(user.total_games, 1);

        let Ok(user) = repo.update_user(user.id, UserDelta::prize(90)).await else {
            panic!("prize failed");
        };
        assert_eq!(user.points, 990);
        assert_eq!(user.total_wins, 1);
        assert_eq!(user.total_earnings, 90);
    }

    #[tokio::test]
    async fn overdraw_is_rejected_atomically() {
        let repo = MemoryRepository::new();
        let Ok(user) = repo.create_user("carol").await else {
            panic!("create failed");
        };
        let Ok(_) = repo.update_user(user.id, UserDelta::credit(50)).await else {
            panic!("credit failed");
        };

        let result = repo.update_user(user.id, UserDelta::stake(100)).await;
        assert!(matches!(result, Err(GatewayError::InsufficientFunds)));

        // Whole delta rejected: balance and stats untouched.
        let Ok(Some(user)) = repo.get_user(user.id).await else {
            panic!("get failed");
        };
        assert_eq!(user.points, 50);
        assert_eq!(user.total_games, 0);
    }

    #[tokio::test]
    async fn update_unknown_user_is_not_found() {
        let repo = MemoryRepository::new();
        let result = repo.update_user(UserId::new(), UserDelta::credit(1)).await;
        assert!(matches!(result, Err(GatewayError::UserNotFound(_))));
    }

    #[tokio::test]
    async fn pool_patch_applies_only_set_fields() {
        let repo = MemoryRepository::new();
        let Ok(pool) = repo.create_pool(make_new_pool()).await else {
            panic!("create failed");
        };
        assert_eq!(pool.status, PoolStatus::Active);

        let Ok(pool) = repo
            .update_pool(
                pool.id,
                PoolPatch {
                    current_players: Some(1),
                    prize_pool: Some(100),
                    ..PoolPatch::default()
                },
            )
            .await
        else {
            panic!("patch failed");
        };
        assert_eq!(pool.current_players, 1);
        assert_eq!(pool.prize_pool, 100);
        assert_eq!(pool.status, PoolStatus::Active);
        assert!(pool.completed_at.is_none());
    }

    #[tokio::test]
    async fn participants_track_membership() {
        let repo = MemoryRepository::new();
        let pool_id = PoolId::new();
        let user_id = UserId::new();

        let Ok(false) = repo.is_participant(pool_id, user_id).await else {
            panic!("unexpected membership");
        };
        let Ok(_) = repo.create_participant(pool_id, user_id).await else {
            panic!("create failed");
        };
        let Ok(true) = repo.is_participant(pool_id, user_id).await else {
            panic!("membership missing");
        };
        let Ok(participants) = repo.participants_for_pool(pool_id).await else {
            panic!("list failed");
        };
        assert_eq!(participants.len(), 1);
    }

    #[tokio::test]
    async fn transactions_come_back_newest_first() {
        let repo = MemoryRepository::new();
        let user_id = UserId::new();
        for (kind, amount) in [
            (TransactionKind::Bonus, 1000),
            (TransactionKind::Join, -100),
        ] {
            let Ok(_) = repo
                .create_transaction(NewTransaction {
                    user_id,
                    kind,
                    amount,
                    description: String::new(),
                    pool_id: None,
                })
                .await
            else {
                panic!("append failed");
            };
        }

        let Ok(ledger) = repo.transactions_for_user(user_id).await else {
            panic!("list failed");
        };
        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger.first().map(|t| t.amount), Some(-100));
    }

    #[tokio::test]
    async fn leaderboard_ranks_by_earnings() {
        let repo = MemoryRepository::new();
        for (name, earnings) in [("low", 10), ("high", 500), ("mid", 90)] {
            let Ok(user) = repo.create_user(name).await else {
                panic!("create failed");
            };
            let Ok(_) = repo
                .update_user(user.id, UserDelta::prize(earnings))
                .await
            else {
                panic!("prize failed");
            };
        }

        let Ok(top) = repo.top_users_by_earnings(2).await else {
            panic!("leaderboard failed");
        };
        assert_eq!(top.len(), 2);
        assert_eq!(top.first().map(|u| u.username.as_str()), Some("high"));
        assert_eq!(top.get(1).map(|u| u.username.as_str()), Some("mid"));
    }
}
