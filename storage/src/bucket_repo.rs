//! Day-bucket repository: atomic counter upserts and window reads.
//!
//! The single statement in [`BucketRepository::upsert_delta`] is the whole concurrency story:
//! increment-or-create happens inside SQLite, so concurrent increments on the same key commute
//! and callers never read-modify-write a shared counter.

use chatstat_core::{Metric, Scope};
use chrono::NaiveDate;
use tracing::{info, warn};

use crate::error::StorageError;
use crate::models::{DayBucket, LeaderboardEntry};
use crate::sqlite_pool::SqlitePoolManager;

#[derive(Clone)]
pub struct BucketRepository {
    pool_manager: SqlitePoolManager,
}

impl BucketRepository {
    /// Creates the repository over an existing pool and ensures the schema exists.
    pub async fn new(pool_manager: SqlitePoolManager) -> Result<Self, StorageError> {
        let repo = Self { pool_manager };
        repo.init().await?;
        Ok(repo)
    }

    async fn init(&self) -> Result<(), StorageError> {
        info!("Creating day_buckets table if not exists");

        let pool = self.pool_manager.pool();

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS day_buckets (
                scope TEXT NOT NULL,
                scope_id INTEGER NOT NULL,
                day TEXT NOT NULL,
                metric TEXT NOT NULL,
                count INTEGER NOT NULL DEFAULT 0,
                PRIMARY KEY (scope, scope_id, day, metric)
            )
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_day_buckets_scope_metric_day
             ON day_buckets(scope, metric, day)",
        )
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Applies `delta` to one (scope, scope_id, day, metric) counter, creating the bucket on
    /// increment. Counters never go below zero; a decrement against a missing or zero bucket
    /// is absorbed rather than stored negative, and never creates a row, so the table stays
    /// sparse.
    pub async fn upsert_delta(
        &self,
        scope: Scope,
        scope_id: i64,
        day: NaiveDate,
        metric: Metric,
        delta: i64,
    ) -> Result<(), StorageError> {
        let pool = self.pool_manager.pool();

        if delta <= 0 {
            sqlx::query(
                r#"
                UPDATE day_buckets SET count = MAX(count + ?, 0)
                WHERE scope = ? AND scope_id = ? AND day = ? AND metric = ?
                "#,
            )
            .bind(delta)
            .bind(scope.as_str())
            .bind(scope_id)
            .bind(day.to_string())
            .bind(metric.as_str())
            .execute(pool)
            .await?;

            return Ok(());
        }

        sqlx::query(
            r#"
            INSERT INTO day_buckets (scope, scope_id, day, metric, count)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(scope, scope_id, day, metric)
            DO UPDATE SET count = MAX(count + ?, 0)
            "#,
        )
        .bind(scope.as_str())
        .bind(scope_id)
        .bind(day.to_string())
        .bind(metric.as_str())
        .bind(delta)
        .bind(delta)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Sets the active-flag bucket for a subject's day to 1.
    ///
    /// Set-to-1, not increment: redelivered events cannot inflate active-day counts.
    pub async fn mark_active(
        &self,
        scope: Scope,
        scope_id: i64,
        day: NaiveDate,
    ) -> Result<(), StorageError> {
        let pool = self.pool_manager.pool();

        sqlx::query(
            r#"
            INSERT INTO day_buckets (scope, scope_id, day, metric, count)
            VALUES (?, ?, ?, ?, 1)
            ON CONFLICT(scope, scope_id, day, metric)
            DO UPDATE SET count = 1
            "#,
        )
        .bind(scope.as_str())
        .bind(scope_id)
        .bind(day.to_string())
        .bind(Metric::ActiveDay.as_str())
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Returns every non-zero bucket for a subject within `[date_from, date_to]` inclusive,
    /// ordered by day then metric. Days with no activity have no rows.
    pub async fn get_range(
        &self,
        scope: Scope,
        scope_id: i64,
        date_from: NaiveDate,
        date_to: NaiveDate,
    ) -> Result<Vec<DayBucket>, StorageError> {
        let pool = self.pool_manager.pool();

        let rows: Vec<(String, String, i64)> = sqlx::query_as(
            r#"
            SELECT day, metric, count FROM day_buckets
            WHERE scope = ? AND scope_id = ? AND day >= ? AND day <= ? AND count > 0
            ORDER BY day ASC, metric ASC
            "#,
        )
        .bind(scope.as_str())
        .bind(scope_id)
        .bind(date_from.to_string())
        .bind(date_to.to_string())
        .fetch_all(pool)
        .await?;

        let buckets = rows
            .into_iter()
            .filter_map(|(day, metric, count)| {
                let day = match day.parse::<NaiveDate>() {
                    Ok(d) => d,
                    Err(_) => {
                        warn!(day = %day, "Skipping bucket with malformed day key");
                        return None;
                    }
                };
                let metric = match Metric::parse(&metric) {
                    Some(m) => m,
                    None => {
                        warn!(metric = %metric, "Skipping bucket with unknown metric");
                        return None;
                    }
                };
                Some(DayBucket { day, metric, count })
            })
            .collect();

        Ok(buckets)
    }

    /// Top subjects by window total for one metric, descending; equal totals break ties by
    /// scope_id ascending so rankings are deterministic.
    pub async fn list_top(
        &self,
        scope: Scope,
        date_from: NaiveDate,
        date_to: NaiveDate,
        metric: Metric,
        limit: i64,
    ) -> Result<Vec<LeaderboardEntry>, StorageError> {
        let pool = self.pool_manager.pool();

        let rows: Vec<(i64, i64)> = sqlx::query_as(
            r#"
            SELECT scope_id, SUM(count) AS total FROM day_buckets
            WHERE scope = ? AND metric = ? AND day >= ? AND day <= ?
            GROUP BY scope_id
            HAVING total > 0
            ORDER BY total DESC, scope_id ASC
            LIMIT ?
            "#,
        )
        .bind(scope.as_str())
        .bind(metric.as_str())
        .bind(date_from.to_string())
        .bind(date_to.to_string())
        .bind(limit)
        .fetch_all(pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(scope_id, total)| LeaderboardEntry { scope_id, total })
            .collect())
    }

    /// Number of distinct subjects of `scope` with an active-flag day in the range.
    pub async fn count_active_subjects(
        &self,
        scope: Scope,
        date_from: NaiveDate,
        date_to: NaiveDate,
    ) -> Result<i64, StorageError> {
        let pool = self.pool_manager.pool();

        let row: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(DISTINCT scope_id) FROM day_buckets
            WHERE scope = ? AND metric = ? AND day >= ? AND day <= ? AND count > 0
            "#,
        )
        .bind(scope.as_str())
        .bind(Metric::ActiveDay.as_str())
        .bind(date_from.to_string())
        .bind(date_to.to_string())
        .fetch_one(pool)
        .await?;

        Ok(row.0)
    }
}
