//! Durable FIFO queues shared between the log sink and the flusher
//!
//! Two named queues take part in a flush:
//!
//! ```text
//!   LogSink ──append──► main ──atomic_move──► pending ──drain──► upload
//!                        ▲                       │
//!                        └──restore_and_clear────┘   (only on upload failure)
//! ```
//!
//! Coordination between the appender and the flusher happens entirely
//! inside the store: `atomic_move` and `restore_and_clear` are the only
//! multi-step operations and both are indivisible with respect to `append`.

pub mod memory;
pub mod sqlite;

pub use memory::MemoryQueue;
pub use sqlite::SqliteQueue;

use crate::error::QueueError;
use async_trait::async_trait;

/// Default name of the queue the sink appends to
pub const DEFAULT_MAIN_KEY: &str = "log_entries";

/// Default name of the queue holding an in-flight batch
pub const DEFAULT_PENDING_KEY: &str = "log_entries:pending";

/// Ordered, persistent queue store
///
/// An absent key and an empty key are indistinguishable to callers.
#[async_trait]
pub trait DurableQueue: Send + Sync + 'static {
    /// Append one entry at the tail of `key`
    async fn append(&self, key: &str, entry: &str) -> Result<(), QueueError>;

    /// Move every entry of `src` to `dst` in one step.
    ///
    /// Returns `false` without touching anything when `src` is empty.
    /// Appends racing with the move land either before it (and move) or
    /// in a fresh `src`. Entries already in `dst` stay ahead of the moved ones.
    async fn atomic_move(&self, src: &str, dst: &str) -> Result<bool, QueueError>;

    /// Read every entry of `key` in order without removing them
    async fn drain_all(&self, key: &str) -> Result<Vec<String>, QueueError>;

    /// Delete `key`; no-op when it is already absent
    async fn clear(&self, key: &str) -> Result<(), QueueError>;

    /// Append every entry of `pending` to the tail of `main`, preserving
    /// order, then delete `pending`, as one indivisible operation.
    async fn restore_and_clear(&self, pending: &str, main: &str) -> Result<(), QueueError>;

    /// Number of entries currently in `key`
    async fn len(&self, key: &str) -> Result<usize, QueueError>;
}

/// Names of the two queues a flush cycle works on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueKeys {
    pub main: String,
    pub pending: String,
}

impl QueueKeys {
    pub fn new(main: impl Into<String>, pending: impl Into<String>) -> Self {
        Self {
            main: main.into(),
            pending: pending.into(),
        }
    }
}

impl Default for QueueKeys {
    fn default() -> Self {
        Self::new(DEFAULT_MAIN_KEY, DEFAULT_PENDING_KEY)
    }
}
