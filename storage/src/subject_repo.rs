//! Subject repository: last-seen display names for leaderboard rendering.
//!
//! Names are refreshed on every counted message, so the summary shows what the user was
//! last called rather than a raw id.

use std::collections::HashMap;

use chrono::Utc;
use tracing::info;

use crate::error::StorageError;
use crate::sqlite_pool::SqlitePoolManager;

#[derive(Clone)]
pub struct SubjectRepository {
    pool_manager: SqlitePoolManager,
}

impl SubjectRepository {
    /// Creates the repository over an existing pool and ensures the schema exists.
    pub async fn new(pool_manager: SqlitePoolManager) -> Result<Self, StorageError> {
        let repo = Self { pool_manager };
        repo.init().await?;
        Ok(repo)
    }

    async fn init(&self) -> Result<(), StorageError> {
        info!("Creating subjects table if not exists");

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS subjects (
                user_id INTEGER PRIMARY KEY,
                display_name TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
        )
        .execute(self.pool_manager.pool())
        .await?;

        Ok(())
    }

    /// Records or refreshes a user's display name.
    pub async fn upsert_name(&self, user_id: i64, display_name: &str) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            INSERT INTO subjects (user_id, display_name, updated_at) VALUES (?, ?, ?)
            ON CONFLICT(user_id) DO UPDATE SET
                display_name = excluded.display_name,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(user_id)
        .bind(display_name)
        .bind(Utc::now().to_rfc3339())
        .execute(self.pool_manager.pool())
        .await?;

        Ok(())
    }

    /// Bulk lookup of display names. Ids never seen are simply absent from the result.
    pub async fn display_names(
        &self,
        user_ids: &[i64],
    ) -> Result<HashMap<i64, String>, StorageError> {
        if user_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let placeholders = vec!["?"; user_ids.len()].join(", ");
        let sql = format!(
            "SELECT user_id, display_name FROM subjects WHERE user_id IN ({})",
            placeholders
        );

        let mut query = sqlx::query_as::<_, (i64, String)>(&sql);
        for id in user_ids {
            query = query.bind(id);
        }

        let rows = query.fetch_all(self.pool_manager.pool()).await?;
        Ok(rows.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn temp_repo() -> (tempfile::TempDir, SubjectRepository) {
        let dir = tempfile::tempdir().expect("tempdir");
        let url = format!("sqlite://{}/subjects_test.db", dir.path().display());
        let pool = SqlitePoolManager::new(&url).await.expect("pool");
        let repo = SubjectRepository::new(pool).await.expect("repo");
        (dir, repo)
    }

    #[tokio::test]
    async fn test_upsert_overwrites_name() {
        let (_dir, repo) = temp_repo().await;

        repo.upsert_name(7, "alice").await.expect("insert");
        repo.upsert_name(7, "alice_renamed").await.expect("update");

        let names = repo.display_names(&[7]).await.expect("lookup");
        assert_eq!(names.get(&7).map(String::as_str), Some("alice_renamed"));
    }

    #[tokio::test]
    async fn test_display_names_skips_unknown_ids() {
        let (_dir, repo) = temp_repo().await;

        repo.upsert_name(1, "alice").await.expect("insert");

        let names = repo.display_names(&[1, 2, 3]).await.expect("lookup");
        assert_eq!(names.len(), 1);
        assert!(names.contains_key(&1));
    }

    #[tokio::test]
    async fn test_display_names_empty_input() {
        let (_dir, repo) = temp_repo().await;

        let names = repo.display_names(&[]).await.expect("lookup");
        assert!(names.is_empty());
    }
}
