//! In-process queue store
//!
//! Same semantics as the SQLite store, held behind a single async mutex so
//! every operation is trivially atomic. Nothing here survives a restart.

use super::DurableQueue;
use crate::error::QueueError;
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use tokio::sync::Mutex;

#[derive(Debug, Default)]
pub struct MemoryQueue {
    queues: Mutex<HashMap<String, VecDeque<String>>>,
}

impl MemoryQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `key` exists at all (empty queues are removed eagerly)
    pub async fn exists(&self, key: &str) -> bool {
        self.queues.lock().await.contains_key(key)
    }
}

#[async_trait]
impl DurableQueue for MemoryQueue {
    async fn append(&self, key: &str, entry: &str) -> Result<(), QueueError> {
        self.queues
            .lock()
            .await
            .entry(key.to_string())
            .or_default()
            .push_back(entry.to_string());
        Ok(())
    }

    async fn atomic_move(&self, src: &str, dst: &str) -> Result<bool, QueueError> {
        let mut queues = self.queues.lock().await;

        let moved = match queues.remove(src) {
            Some(entries) if !entries.is_empty() => entries,
            _ => return Ok(false),
        };

        queues.entry(dst.to_string()).or_default().extend(moved);
        Ok(true)
    }

    async fn drain_all(&self, key: &str) -> Result<Vec<String>, QueueError> {
        Ok(self
            .queues
            .lock()
            .await
            .get(key)
            .map(|entries| entries.iter().cloned().collect())
            .unwrap_or_default())
    }

    async fn clear(&self, key: &str) -> Result<(), QueueError> {
        self.queues.lock().await.remove(key);
        Ok(())
    }

    async fn restore_and_clear(&self, pending: &str, main: &str) -> Result<(), QueueError> {
        let mut queues = self.queues.lock().await;

        if let Some(entries) = queues.remove(pending) {
            if !entries.is_empty() {
                queues.entry(main.to_string()).or_default().extend(entries);
            }
        }

        Ok(())
    }

    async fn len(&self, key: &str) -> Result<usize, QueueError> {
        Ok(self.queues.lock().await.get(key).map_or(0, VecDeque::len))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_move_empty_source_is_noop() {
        let queue = MemoryQueue::new();

        assert!(!queue.atomic_move("main", "pending").await.unwrap());
        assert!(!queue.exists("pending").await);
    }

    #[tokio::test]
    async fn test_move_then_append_lands_in_fresh_source() {
        let queue = MemoryQueue::new();
        queue.append("main", "a").await.unwrap();
        queue.append("main", "b").await.unwrap();

        assert!(queue.atomic_move("main", "pending").await.unwrap());
        queue.append("main", "c").await.unwrap();

        assert_eq!(queue.drain_all("pending").await.unwrap(), vec!["a", "b"]);
        assert_eq!(queue.drain_all("main").await.unwrap(), vec!["c"]);
    }

    #[tokio::test]
    async fn test_move_keeps_existing_destination_entries_first() {
        let queue = MemoryQueue::new();
        queue.append("pending", "stranded").await.unwrap();
        queue.append("main", "fresh").await.unwrap();

        assert!(queue.atomic_move("main", "pending").await.unwrap());

        assert_eq!(
            queue.drain_all("pending").await.unwrap(),
            vec!["stranded", "fresh"]
        );
    }

    #[tokio::test]
    async fn test_restore_appends_to_tail() {
        let queue = MemoryQueue::new();
        queue.append("pending", "x").await.unwrap();
        queue.append("pending", "y").await.unwrap();
        queue.append("main", "z").await.unwrap();

        queue.restore_and_clear("pending", "main").await.unwrap();

        assert_eq!(queue.drain_all("main").await.unwrap(), vec!["z", "x", "y"]);
        assert!(!queue.exists("pending").await);
    }

    #[tokio::test]
    async fn test_restore_with_empty_pending_leaves_main_untouched() {
        let queue = MemoryQueue::new();
        queue.append("main", "z").await.unwrap();

        queue.restore_and_clear("pending", "main").await.unwrap();

        assert_eq!(queue.drain_all("main").await.unwrap(), vec!["z"]);
        assert!(!queue.exists("pending").await);
    }

    #[tokio::test]
    async fn test_clear_is_idempotent() {
        let queue = MemoryQueue::new();
        queue.append("main", "a").await.unwrap();

        queue.clear("main").await.unwrap();
        queue.clear("main").await.unwrap();

        assert_eq!(queue.len("main").await.unwrap(), 0);
    }
}
