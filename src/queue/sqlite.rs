//! SQLite-backed durable queue
//!
//! All queues live in one `queue_entries` table keyed by queue name; the
//! AUTOINCREMENT id gives the FIFO order. This provides:
//! - Connection pooling (connections are checked out per operation)
//! - Automatic migrations
//! - WAL mode so the appender and the flusher do not block each other on reads
//! - Single-statement move and single-transaction restore

use super::DurableQueue;
use crate::config::StoreConfig;
use crate::error::QueueError;
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use sqlx::ConnectOptions;
use std::path::Path;
use std::time::Duration;

/// Queue store handle
///
/// Cloning is cheap; clones share the same pool.
#[derive(Debug, Clone)]
pub struct SqliteQueue {
    pool: SqlitePool,
}

impl SqliteQueue {
    /// Open (or create) the queue database and run migrations
    ///
    /// # Example
    ///
    /// ```ignore
    /// let queue = SqliteQueue::open(Path::new("./data/log_queue.db"), 5, Duration::from_secs(30)).await?;
    /// ```
    pub async fn open(
        database_path: &Path,
        max_connections: u32,
        busy_timeout: Duration,
    ) -> Result<Self, QueueError> {
        if let Some(parent) = database_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| QueueError::Unavailable(e.into()))?;
            }
        }

        // Statement logging would feed the log sink that appends to this very store.
        let options = SqliteConnectOptions::new()
            .filename(database_path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(busy_timeout)
            .pragma("synchronous", "NORMAL")
            .disable_statement_logging();

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(busy_timeout)
            .connect_with(options)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        tracing::debug!(
            database = %database_path.display(),
            "Queue database ready"
        );

        Ok(Self { pool })
    }

    pub async fn from_config(config: &StoreConfig) -> Result<Self, QueueError> {
        Self::open(
            Path::new(&config.database_path),
            config.max_connections,
            Duration::from_secs(config.busy_timeout_seconds),
        )
        .await
    }

    /// Close every pooled connection
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl DurableQueue for SqliteQueue {
    async fn append(&self, key: &str, entry: &str) -> Result<(), QueueError> {
        sqlx::query("INSERT INTO queue_entries (queue_key, entry) VALUES (?, ?)")
            .bind(key)
            .bind(entry)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn atomic_move(&self, src: &str, dst: &str) -> Result<bool, QueueError> {
        // One statement: appends commit either before it (and move) or after it.
        let result = sqlx::query("UPDATE queue_entries SET queue_key = ? WHERE queue_key = ?")
            .bind(dst)
            .bind(src)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn drain_all(&self, key: &str) -> Result<Vec<String>, QueueError> {
        let entries = sqlx::query_scalar::<_, String>(
            "SELECT entry FROM queue_entries WHERE queue_key = ? ORDER BY id ASC",
        )
        .bind(key)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    async fn clear(&self, key: &str) -> Result<(), QueueError> {
        sqlx::query("DELETE FROM queue_entries WHERE queue_key = ?")
            .bind(key)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn restore_and_clear(&self, pending: &str, main: &str) -> Result<(), QueueError> {
        let mut tx = self.pool.begin().await?;

        // Fresh ids put the restored entries behind anything appended meanwhile.
        sqlx::query(
            "INSERT INTO queue_entries (queue_key, entry)
             SELECT ?, entry FROM queue_entries WHERE queue_key = ? ORDER BY id ASC",
        )
        .bind(main)
        .bind(pending)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM queue_entries WHERE queue_key = ?")
            .bind(pending)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(())
    }

    async fn len(&self, key: &str) -> Result<usize, QueueError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM queue_entries WHERE queue_key = ?",
        )
        .bind(key)
        .fetch_one(&self.pool)
        .await?;

        Ok(count as usize)
    }
}
