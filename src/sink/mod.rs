//! Log sink: application log records into the main durable queue
//!
//! - [`LogSink`] appends one formatted entry to the main queue
//! - [`SinkWriter`] puts a channel and a single appender task in front of
//!   the sink, so logging call sites never wait on the store
//! - [`QueueLayer`] feeds tracing events into a `SinkWriter`

pub mod entry;
pub mod layer;

pub use entry::LogEntry;
pub use layer::QueueLayer;

use crate::error::QueueError;
use crate::queue::DurableQueue;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

/// Appends entries to whatever queue currently holds the main name
#[derive(Clone)]
pub struct LogSink {
    queue: Arc<dyn DurableQueue>,
    main_key: String,
}

impl LogSink {
    pub fn new(queue: Arc<dyn DurableQueue>, main_key: impl Into<String>) -> Self {
        Self {
            queue,
            main_key: main_key.into(),
        }
    }

    pub async fn append(&self, entry: &LogEntry) -> Result<(), QueueError> {
        self.queue.append(&self.main_key, entry.as_str()).await
    }

    pub fn main_key(&self) -> &str {
        &self.main_key
    }
}

/// Message types for the appender task
#[derive(Debug)]
enum SinkMessage {
    Entry(LogEntry),
    Sync(oneshot::Sender<()>),
}

/// Non-blocking handle to the appender task
///
/// Entries are appended in the order they were written. A failed append is
/// reported on stderr and the entry is dropped; it is never re-logged
/// through tracing, which would loop back into this sink.
#[derive(Clone)]
pub struct SinkWriter {
    sender: mpsc::UnboundedSender<SinkMessage>,
}

impl SinkWriter {
    /// Spawn the appender task
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(sink: LogSink) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            appender_task(sink, rx).await;
        });

        Self { sender: tx }
    }

    /// Queue an entry for appending (non-blocking)
    pub fn write(&self, entry: LogEntry) {
        // Send only fails once the appender task is gone (runtime shutdown)
        let _ = self.sender.send(SinkMessage::Entry(entry));
    }

    /// Wait until every entry written before this call has been appended
    pub async fn sync(&self) {
        let (tx, rx) = oneshot::channel();
        if self.sender.send(SinkMessage::Sync(tx)).is_ok() {
            let _ = rx.await;
        }
    }
}

/// Background appender task
async fn appender_task(sink: LogSink, mut rx: mpsc::UnboundedReceiver<SinkMessage>) {
    while let Some(msg) = rx.recv().await {
        match msg {
            SinkMessage::Entry(entry) => {
                if let Err(e) = sink.append(&entry).await {
                    eprintln!(
                        "log-shipper: failed to append log entry to '{}': {}",
                        sink.main_key(),
                        e
                    );
                }
            }
            SinkMessage::Sync(ack) => {
                let _ = ack.send(());
            }
        }
    }
}
