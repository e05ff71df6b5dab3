//! Meta repository: the published-summary pointer for the monitored chat.

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::error::StorageError;
use crate::models::MetaRecord;
use crate::sqlite_pool::SqlitePoolManager;

#[derive(Clone)]
pub struct MetaRepository {
    pool_manager: SqlitePoolManager,
}

impl MetaRepository {
    /// Creates the repository over an existing pool and ensures the schema exists.
    pub async fn new(pool_manager: SqlitePoolManager) -> Result<Self, StorageError> {
        let repo = Self { pool_manager };
        repo.init().await?;
        Ok(repo)
    }

    async fn init(&self) -> Result<(), StorageError> {
        info!("Creating meta table if not exists");

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS meta (
                chat_id INTEGER PRIMARY KEY,
                summary_message_id INTEGER,
                refreshed_at TEXT
            )
            "#,
        )
        .execute(self.pool_manager.pool())
        .await?;

        Ok(())
    }

    /// Returns the meta record for a chat, or an empty record if none was stored yet.
    pub async fn get(&self, chat_id: i64) -> Result<MetaRecord, StorageError> {
        let row: Option<(Option<i64>, Option<String>)> = sqlx::query_as(
            "SELECT summary_message_id, refreshed_at FROM meta WHERE chat_id = ?",
        )
        .bind(chat_id)
        .fetch_optional(self.pool_manager.pool())
        .await?;

        let Some((summary_message_id, refreshed_at)) = row else {
            return Ok(MetaRecord::empty(chat_id));
        };

        let refreshed_at = refreshed_at.and_then(|raw| {
            match DateTime::parse_from_rfc3339(&raw) {
                Ok(ts) => Some(ts.with_timezone(&Utc)),
                Err(_) => {
                    warn!(chat_id, refreshed_at = %raw, "Ignoring malformed refresh timestamp");
                    None
                }
            }
        });

        Ok(MetaRecord {
            chat_id,
            summary_message_id,
            refreshed_at,
        })
    }

    /// Stores the id of the summary message currently being edited for this chat.
    pub async fn set_summary_message(
        &self,
        chat_id: i64,
        message_id: i64,
    ) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            INSERT INTO meta (chat_id, summary_message_id) VALUES (?, ?)
            ON CONFLICT(chat_id) DO UPDATE SET summary_message_id = excluded.summary_message_id
            "#,
        )
        .bind(chat_id)
        .bind(message_id)
        .execute(self.pool_manager.pool())
        .await?;

        Ok(())
    }

    /// Records the time of the latest successful refresh.
    pub async fn mark_refreshed(
        &self,
        chat_id: i64,
        refreshed_at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            INSERT INTO meta (chat_id, refreshed_at) VALUES (?, ?)
            ON CONFLICT(chat_id) DO UPDATE SET refreshed_at = excluded.refreshed_at
            "#,
        )
        .bind(chat_id)
        .bind(refreshed_at.to_rfc3339())
        .execute(self.pool_manager.pool())
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite_pool::SqlitePoolManager;
    use chrono::TimeZone;

    async fn temp_repo() -> (tempfile::TempDir, MetaRepository) {
        let dir = tempfile::tempdir().expect("tempdir");
        let url = format!("sqlite://{}/meta_test.db", dir.path().display());
        let pool = SqlitePoolManager::new(&url).await.expect("pool");
        let repo = MetaRepository::new(pool).await.expect("repo");
        (dir, repo)
    }

    #[tokio::test]
    async fn test_get_returns_empty_record_when_unset() {
        let (_dir, repo) = temp_repo().await;

        let record = repo.get(42).await.expect("get");

        assert_eq!(record, MetaRecord::empty(42));
    }

    #[tokio::test]
    async fn test_summary_message_round_trip() {
        let (_dir, repo) = temp_repo().await;

        repo.set_summary_message(42, 777).await.expect("set");
        let record = repo.get(42).await.expect("get");

        assert_eq!(record.summary_message_id, Some(777));
        assert_eq!(record.refreshed_at, None);
    }

    #[tokio::test]
    async fn test_mark_refreshed_keeps_message_id() {
        let (_dir, repo) = temp_repo().await;
        let ts = Utc.with_ymd_and_hms(2024, 3, 7, 0, 0, 5).unwrap();

        repo.set_summary_message(42, 777).await.expect("set");
        repo.mark_refreshed(42, ts).await.expect("mark");
        let record = repo.get(42).await.expect("get");

        assert_eq!(record.summary_message_id, Some(777));
        assert_eq!(record.refreshed_at, Some(ts));
    }

    #[tokio::test]
    async fn test_set_summary_message_overwrites() {
        let (_dir, repo) = temp_repo().await;

        repo.set_summary_message(42, 1).await.expect("set");
        repo.set_summary_message(42, 2).await.expect("set again");

        let record = repo.get(42).await.expect("get");
        assert_eq!(record.summary_message_id, Some(2));
    }
}
