//! Window aggregator: folds day buckets into rolling-window summaries.
//!
//! Read-only over the store. Windows resolve to calendar days: "last 24h" is today's bucket,
//! "last 7d" the seven buckets ending today. Exact sub-day windows would need finer-grained
//! storage; day buckets keep volume and query cost low at the price of boundary imprecision.

use std::sync::Arc;

use chatstat_core::{window_start, Metric, Scope};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use storage::{BucketRepository, LeaderboardEntry, StorageError};

/// Rolling-window totals for one subject. Derived on demand, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub messages: i64,
    pub reactions_given: i64,
    pub reactions_received: i64,
    /// Distinct days in the window on which the subject was active.
    pub active_days: i64,
}

pub struct WindowAggregator {
    store: Arc<BucketRepository>,
}

impl WindowAggregator {
    pub fn new(store: Arc<BucketRepository>) -> Self {
        Self { store }
    }

    /// Sums the subject's buckets over `[as_of - (window_days - 1), as_of]`.
    ///
    /// A window with no recorded activity yields an all-zero snapshot, not an error.
    pub async fn compute_snapshot(
        &self,
        scope: Scope,
        scope_id: i64,
        window_days: u32,
        as_of: NaiveDate,
    ) -> Result<StatsSnapshot, StorageError> {
        let start = window_start(as_of, window_days);
        let buckets = self.store.get_range(scope, scope_id, start, as_of).await?;

        let mut snapshot = StatsSnapshot::default();
        for bucket in buckets {
            match bucket.metric {
                Metric::MessagesSent => snapshot.messages += bucket.count,
                Metric::ReactionsGiven => snapshot.reactions_given += bucket.count,
                Metric::ReactionsReceived => snapshot.reactions_received += bucket.count,
                Metric::ActiveDay => {
                    if bucket.count > 0 {
                        snapshot.active_days += 1;
                    }
                }
            }
        }
        Ok(snapshot)
    }

    /// Per-user ranking for one metric over the window, descending with deterministic
    /// ascending-id tie-break.
    pub async fn compute_leaderboard(
        &self,
        metric: Metric,
        window_days: u32,
        as_of: NaiveDate,
        limit: i64,
    ) -> Result<Vec<LeaderboardEntry>, StorageError> {
        let start = window_start(as_of, window_days);
        self.store
            .list_top(Scope::User, start, as_of, metric, limit)
            .await
    }

    /// Number of distinct users active on at least one day of the window.
    pub async fn count_active_users(
        &self,
        window_days: u32,
        as_of: NaiveDate,
    ) -> Result<i64, StorageError> {
        let start = window_start(as_of, window_days);
        self.store
            .count_active_subjects(Scope::User, start, as_of)
            .await
    }
}
