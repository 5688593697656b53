//! Domain events reflecting pool lifecycle transitions.
//!
//! Every externally visible pool state change emits a [`PoolEvent`]
//! through the [`super::EventBus`]. Events are broadcast to WebSocket
//! subscribers. They are always published *after* the pool's lock has
//! been released, from a snapshot of the new state, so fan-out never
//! happens inside a critical section.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::model::Pool;
use super::{PoolId, UserId};

/// Domain event emitted after a pool state change.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum PoolEvent {
    /// Emitted when a new pool opens.
    PoolCreated {
        /// Snapshot of the freshly created pool.
        pool: Pool,
        /// Creation timestamp.
        timestamp: DateTime<Utc>,
    },

    /// Emitted after a successful join mutates pool counters.
    PoolUpdated {
        /// Snapshot of the pool after the mutation.
        pool: Pool,
        /// Mutation timestamp.
        timestamp: DateTime<Utc>,
    },

    /// Emitted exactly once when a pool settles.
    PoolCompleted {
        /// Pool that settled.
        pool_id: PoolId,
        /// Users selected as winners, in position order.
        winner_ids: Vec<UserId>,
        /// Settlement timestamp.
        timestamp: DateTime<Utc>,
    },
}

impl PoolEvent {
    /// Returns the pool ID associated with this event.
    #[must_use]
    pub fn pool_id(&self) -> PoolId {
        match self {
            Self::PoolCreated { pool, .. } | Self::PoolUpdated { pool, .. } => pool.id,
            Self::PoolCompleted { pool_id, .. } => *pool_id,
        }
    }

    /// Returns the event type as a static string slice.
    #[must_use]
    pub const fn event_type_str(&self) -> &'static str {
        match self {
            Self::PoolCreated { .. } => "pool_created",
            Self::PoolUpdated { .. } => "pool_updated",
            Self::PoolCompleted { .. } => "pool_completed",
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::model::{PoolCategory, PoolStatus};

    fn make_pool() -> Pool {
        let now = Utc::now();
        Pool {
            id: PoolId::new(),
            name: "Lightning Round".to_string(),
            description: "2-minute speed pool".to_string(),
            entry_cost: 50,
            max_players: 40,
            current_players: 39,
            prize_pool: 1950,
            winner_count: 1,
            category: PoolCategory::Lightning,
            status: PoolStatus::Active,
            created_at: now,
            ends_at: now,
            completed_at: None,
        }
    }

    #[test]
    fn event_type_strings() {
        let pool = make_pool();
        let created = PoolEvent::PoolCreated {
            pool: pool.clone(),
            timestamp: Utc::now(),
        };
        assert_eq!(created.event_type_str(), "pool_created");

        let completed = PoolEvent::PoolCompleted {
            pool_id: pool.id,
            winner_ids: vec![],
            timestamp: Utc::now(),
        };
        assert_eq!(completed.event_type_str(), "pool_completed");
    }

    #[test]
    fn pool_id_accessor_covers_all_variants() {
        let pool = make_pool();
        let id = pool.id;
        let updated = PoolEvent::PoolUpdated {
            pool,
            timestamp: Utc::now(),
        };
        assert_eq!(updated.pool_id(), id);

        let completed = PoolEvent::PoolCompleted {
            pool_id: id,
            winner_ids: vec![UserId::new()],
            timestamp: Utc::now(),
        };
        assert_eq!(completed.pool_id(), id);
    }

    #[test]
    fn completed_event_serializes_with_tag_and_winners() {
        let winner = UserId::new();
        let event = PoolEvent::PoolCompleted {
            pool_id: PoolId::new(),
            winner_ids: vec![winner],
            timestamp: Utc::now(),
        };
        let json = serde_json::to_string(&event).unwrap_or_default();
        assert!(json.contains("\"event_type\":\"pool_completed\""));
        assert!(json.contains(&winner.to_string()));
    }
}
