use std::time::Duration;
use thiserror::Error;

/// Durable store failures
///
/// Every queue operation either succeeds or reports the store as unavailable;
/// the flush cycle aborts on this error without retrying.
#[derive(Debug, Error)]
pub enum QueueError {
    /// Store unreachable or the statement failed
    #[error("Queue unavailable: {0}")]
    Unavailable(#[from] sqlx::Error),
    /// Schema migration failed while opening the store
    #[error("Queue migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Failures talking to the blob storage collaborator
///
/// The flush worker treats every variant the same way (rollback); the
/// distinction only matters for logs.
#[derive(Debug, Error)]
pub enum UploadError {
    /// Authorization or upload URL could not be obtained
    #[error("Credential error: {0}")]
    Credential(String),
    /// Storage answered with a non-success status
    #[error("Upload rejected ({status}): {body}")]
    Rejected { status: u16, body: String },
    /// Connection-level failure
    #[error("Upload transport error: {0}")]
    Transport(#[from] reqwest::Error),
    /// The call did not finish within the per-call deadline
    #[error("Upload call timed out after {0:?}")]
    TimedOut(Duration),
}

/// Failures that end a flush cycle without a clean confirm or rollback
#[derive(Debug, Error)]
pub enum FlushError {
    /// A queue operation failed; state is left as-is
    #[error(transparent)]
    Queue(#[from] QueueError),
    /// The upload failed and restoring pending entries failed too.
    /// Entries stay stranded in the pending queue.
    #[error("Failed to restore {entries} pending entries after upload failure ({upload}): {source}")]
    Restore {
        entries: usize,
        upload: UploadError,
        #[source]
        source: QueueError,
    },
}

impl UploadError {
    /// Short stable name used as a structured log field
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Credential(_) => "credential_error",
            Self::Rejected { .. } => "upload_rejected",
            Self::Transport(_) => "transport_error",
            Self::TimedOut(_) => "timed_out",
        }
    }
}

impl FlushError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Queue(_) => "queue_unavailable",
            Self::Restore { .. } => "restore_failed",
        }
    }
}
