use async_trait::async_trait;
use chrono::Utc;
use sqlx::{sqlite::SqliteConnectOptions, ConnectOptions, SqlitePool};
use std::{path::Path, str::FromStr};
use thiserror::Error;

use crate::forms::{self, ValidationError};
use crate::tasks::{Task, TaskOrder, TaskPatch};

/// Default timeout for individual SQLite queries.
/// Prevents a hung query from blocking the request indefinitely.
const QUERY_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);

/// Execute a future with the standard query timeout.
async fn with_timeout<T>(
    fut: impl std::future::Future<Output = Result<T, StoreError>>,
) -> Result<T, StoreError> {
    match tokio::time::timeout(QUERY_TIMEOUT, fut).await {
        Ok(result) => result,
        Err(_) => Err(StoreError::Timeout(QUERY_TIMEOUT.as_secs())),
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Task {0} not found!")]
    NotFound(i64),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("database query timed out after {0}s")]
    Timeout(u64),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Durable collection of tasks. The store exclusively owns all task rows;
/// handlers fetch a fresh copy per request.
///
/// Any backing engine can implement this; `SqliteStore` below is the one the
/// binary wires up.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Insert a new task. The description is re-validated and stored trimmed;
    /// the form validator should already have rejected bad input upstream.
    async fn create(&self, description: &str, is_completed: bool) -> Result<Task, StoreError>;

    async fn get(&self, id: i64) -> Result<Task, StoreError>;

    /// Partial update of description and/or completion flag. Refreshes
    /// `updated_at`.
    async fn update(&self, id: i64, patch: TaskPatch) -> Result<Task, StoreError>;

    /// Remove a task permanently. Deleting an id twice fails the second time.
    async fn delete(&self, id: i64) -> Result<(), StoreError>;

    async fn list(&self, order: TaskOrder) -> Result<Vec<Task>, StoreError>;

    async fn count(&self) -> Result<u64, StoreError>;

    async fn mark_completed(&self, id: i64) -> Result<Task, StoreError> {
        self.update(id, TaskPatch::completed(true)).await
    }

    async fn mark_incomplete(&self, id: i64) -> Result<Task, StoreError> {
        self.update(id, TaskPatch::completed(false)).await
    }
}

#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub async fn new(data_dir: &Path) -> Result<Self, StoreError> {
        Self::new_with_slow_query(data_dir, 0).await
    }

    /// Create the store with slow-query logging enabled.
    ///
    /// `slow_query_ms` is the threshold in milliseconds — queries exceeding
    /// it are logged at WARN level. Set to 0 to disable slow-query logging.
    pub async fn new_with_slow_query(
        data_dir: &Path,
        slow_query_ms: u64,
    ) -> Result<Self, StoreError> {
        tokio::fs::create_dir_all(data_dir)
            .await
            .map_err(|e| StoreError::Database(sqlx::Error::Io(e)))?;
        let db_path = data_dir.join("taskpad.db");
        let mut opts =
            SqliteConnectOptions::from_str(&format!("sqlite://{}?mode=rwc", db_path.display()))?
                .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
                .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
                .create_if_missing(true);

        if slow_query_ms > 0 {
            opts = opts.log_slow_statements(
                log::LevelFilter::Warn,
                std::time::Duration::from_millis(slow_query_ms),
            );
        }

        let pool = SqlitePool::connect_with(opts).await?;
        Self::migrate(&pool).await?;
        Ok(Self { pool })
    }

    /// Return a clone of the connection pool (cheap — Arc-backed).
    pub fn pool(&self) -> SqlitePool {
        self.pool.clone()
    }

    async fn migrate(pool: &SqlitePool) -> Result<(), StoreError> {
        sqlx::migrate!("src/storage/migrations")
            .run(pool)
            .await
            .map_err(sqlx::Error::from)?;
        Ok(())
    }
}

#[async_trait]
impl TaskStore for SqliteStore {
    async fn create(&self, description: &str, is_completed: bool) -> Result<Task, StoreError> {
        let cleaned = forms::clean_task(description)?;
        let now = Utc::now().to_rfc3339();
        let result = sqlx::query(
            "INSERT INTO tasks (description, is_completed, created_at, updated_at)
             VALUES (?, ?, ?, ?)",
        )
        .bind(&cleaned)
        .bind(is_completed)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;
        self.get(result.last_insert_rowid()).await
    }

    async fn get(&self, id: i64) -> Result<Task, StoreError> {
        sqlx::query_as("SELECT * FROM tasks WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound(id))
    }

    async fn update(&self, id: i64, patch: TaskPatch) -> Result<Task, StoreError> {
        // Entity invariants hold on every write path: never empty after
        // trimming, never over the column limit. The min-length rule is a
        // form rule, not an entity one — short edits stay legal here.
        let description = match patch.description {
            Some(raw) => {
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    return Err(ValidationError::Empty.into());
                }
                if trimmed.chars().count() > forms::MAX_TASK_LEN {
                    return Err(ValidationError::TooLong.into());
                }
                Some(trimmed.to_string())
            }
            None => None,
        };

        let now = Utc::now().to_rfc3339();
        let result = sqlx::query(
            "UPDATE tasks
             SET description = COALESCE(?, description),
                 is_completed = COALESCE(?, is_completed),
                 updated_at = ?
             WHERE id = ?",
        )
        .bind(description)
        .bind(patch.is_completed)
        .bind(&now)
        .bind(id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }
        self.get(id).await
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }

    async fn list(&self, order: TaskOrder) -> Result<Vec<Task>, StoreError> {
        let sql = match order {
            TaskOrder::NewestFirst => {
                "SELECT * FROM tasks ORDER BY created_at DESC, id DESC"
            }
            TaskOrder::ActiveFirst => {
                "SELECT * FROM tasks ORDER BY is_completed ASC, id DESC"
            }
        };
        with_timeout(async {
            Ok(sqlx::query_as(sql).fetch_all(&self.pool).await?)
        })
        .await
    }

    async fn count(&self) -> Result<u64, StoreError> {
        with_timeout(async {
            let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tasks")
                .fetch_one(&self.pool)
                .await?;
            Ok(row.0 as u64)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn store() -> (TempDir, SqliteStore) {
        let dir = TempDir::new().unwrap();
        let store = SqliteStore::new(dir.path()).await.unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn create_trims_and_defaults_to_incomplete() {
        let (_dir, store) = store().await;
        let task = store.create("  Buy milk  ", false).await.unwrap();
        assert_eq!(task.description, "Buy milk");
        assert!(!task.is_completed);
        assert_eq!(task.created_at, task.updated_at);
    }

    #[tokio::test]
    async fn create_rejects_invalid_description() {
        let (_dir, store) = store().await;
        let err = store.create("   ", false).await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::Validation(ValidationError::Empty)
        ));
        let err = store.create("ab", false).await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::Validation(ValidationError::TooShort)
        ));
    }

    #[tokio::test]
    async fn double_toggle_round_trips_and_bumps_updated_at() {
        let (_dir, store) = store().await;
        let task = store.create("Water plants", false).await.unwrap();

        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let done = store.mark_completed(task.id).await.unwrap();
        assert!(done.is_completed);
        assert!(done.updated_at > task.updated_at);
        assert_eq!(done.created_at, task.created_at);

        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let undone = store.mark_incomplete(task.id).await.unwrap();
        assert_eq!(undone.is_completed, task.is_completed);
        assert!(undone.updated_at > done.updated_at);
    }

    #[tokio::test]
    async fn active_first_lists_incomplete_before_complete() {
        let (_dir, store) = store().await;
        let t1 = store.create("first", true).await.unwrap();
        let t2 = store.create("second", false).await.unwrap();
        let t3 = store.create("third", false).await.unwrap();

        let ids: Vec<i64> = store
            .list(TaskOrder::ActiveFirst)
            .await
            .unwrap()
            .iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(ids, vec![t3.id, t2.id, t1.id]);
    }

    #[tokio::test]
    async fn newest_first_orders_by_creation() {
        let (_dir, store) = store().await;
        let t1 = store.create("older", false).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let t2 = store.create("newer", true).await.unwrap();

        let ids: Vec<i64> = store
            .list(TaskOrder::NewestFirst)
            .await
            .unwrap()
            .iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(ids, vec![t2.id, t1.id]);
    }

    #[tokio::test]
    async fn update_patches_only_named_fields() {
        let (_dir, store) = store().await;
        let task = store.create("Call the bank", true).await.unwrap();

        let edited = store
            .update(task.id, TaskPatch::description("  Call the dentist "))
            .await
            .unwrap();
        assert_eq!(edited.description, "Call the dentist");
        assert!(edited.is_completed, "completion flag must be untouched");

        let err = store
            .update(task.id, TaskPatch::description(" \t "))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::Validation(ValidationError::Empty)
        ));
        // Failed update leaves the row alone.
        assert_eq!(
            store.get(task.id).await.unwrap().description,
            "Call the dentist"
        );
    }

    #[tokio::test]
    async fn delete_missing_id_is_not_found_and_count_unchanged() {
        let (_dir, store) = store().await;
        store.create("keep me", false).await.unwrap();

        let err = store.delete(9999).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(9999)));
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn second_delete_of_same_id_fails() {
        let (_dir, store) = store().await;
        let task = store.create("ephemeral", false).await.unwrap();
        store.delete(task.id).await.unwrap();
        let err = store.delete(task.id).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn get_missing_id_is_not_found() {
        let (_dir, store) = store().await;
        assert!(matches!(
            store.get(42).await.unwrap_err(),
            StoreError::NotFound(42)
        ));
    }

    #[tokio::test]
    async fn update_missing_id_is_not_found() {
        let (_dir, store) = store().await;
        let err = store
            .update(7, TaskPatch::completed(true))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(7)));
    }
}
