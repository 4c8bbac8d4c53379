//! One flush cycle: move → drain → upload → confirm or roll back
//!
//! ```text
//! IDLE → CHECKING → MOVED → UPLOADING → CONFIRMED  → IDLE
//!                                     ↘ ROLLED_BACK → IDLE
//! ```
//!
//! Each step returns an explicit result; the cycle matches on it to pick
//! the next state. Upload-side failures (credentials, transport, status,
//! deadline) all lead to rollback. Queue failures abort the cycle and leave
//! the store as it is.

use crate::config::{FlushConfig, UploaderConfig};
use crate::error::{FlushError, UploadError};
use crate::queue::{DurableQueue, QueueKeys};
use crate::uploader::{object_name, BlobUploader};
use chrono::{FixedOffset, Utc};
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Flush cycle states, reported in logs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushState {
    Idle,
    Checking,
    Moved,
    Uploading,
    Confirmed,
    RolledBack,
}

impl fmt::Display for FlushState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Checking => "checking",
            Self::Moved => "moved",
            Self::Uploading => "uploading",
            Self::Confirmed => "confirmed",
            Self::RolledBack => "rolled_back",
        };
        f.write_str(name)
    }
}

/// Result of a cycle that reached a clean end state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlushOutcome {
    /// Main was empty or absent; nothing was moved or uploaded
    NothingToFlush,
    /// Batch stored remotely and pending cleared
    Uploaded {
        entries: usize,
        bytes: usize,
        object_name: String,
    },
    /// Upload failed; entries were restored to the tail of main
    RolledBack { entries: usize, reason: String },
}

/// Retry and deadline policy for the upload step
#[derive(Debug, Clone, Copy)]
pub struct FlushPolicy {
    /// Credential + upload attempts before rolling back
    pub max_attempts: u32,
    /// Delay before attempt `n` is `n * retry_backoff`
    pub retry_backoff: Duration,
    /// Deadline for each collaborator call
    pub call_timeout: Duration,
}

impl Default for FlushPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            retry_backoff: Duration::from_secs(2),
            call_timeout: Duration::from_secs(60),
        }
    }
}

impl FlushPolicy {
    /// Delay before retrying after failed attempt `attempt`; saturates
    /// instead of overflowing
    pub fn retry_delay(&self, attempt: u32) -> Duration {
        self.retry_backoff
            .checked_mul(attempt)
            .unwrap_or(Duration::MAX)
    }
}

impl From<&FlushConfig> for FlushPolicy {
    fn from(config: &FlushConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            retry_backoff: Duration::from_millis(config.retry_backoff_ms),
            call_timeout: Duration::from_secs(config.call_timeout_seconds),
        }
    }
}

/// Runs flush cycles against an injected queue and uploader
pub struct FlushWorker {
    queue: Arc<dyn DurableQueue>,
    uploader: Arc<dyn BlobUploader>,
    keys: QueueKeys,
    policy: FlushPolicy,
    object_prefix: String,
    offset: FixedOffset,
}

impl FlushWorker {
    pub fn new(
        queue: Arc<dyn DurableQueue>,
        uploader: Arc<dyn BlobUploader>,
        keys: QueueKeys,
        object_prefix: impl Into<String>,
        offset: FixedOffset,
    ) -> Self {
        Self {
            queue,
            uploader,
            keys,
            policy: FlushPolicy::default(),
            object_prefix: object_prefix.into(),
            offset,
        }
    }

    pub fn from_config(
        queue: Arc<dyn DurableQueue>,
        uploader: Arc<dyn BlobUploader>,
        keys: QueueKeys,
        flush: &FlushConfig,
        uploader_config: &UploaderConfig,
        offset: FixedOffset,
    ) -> Self {
        Self::new(queue, uploader, keys, &uploader_config.object_prefix, offset)
            .with_policy(FlushPolicy::from(flush))
    }

    pub fn with_policy(mut self, policy: FlushPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn keys(&self) -> &QueueKeys {
        &self.keys
    }

    /// Run one cycle
    ///
    /// `Ok` covers every clean end state, including a successful rollback.
    /// `Err` means the cycle was aborted by the store or the rollback itself
    /// failed.
    pub async fn run_cycle(&self) -> Result<FlushOutcome, FlushError> {
        let main = self.keys.main.as_str();
        let pending = self.keys.pending.as_str();
        let started = Instant::now();

        tracing::debug!(state = %FlushState::Checking, "Flush cycle started");

        let stranded = self.queue.len(pending).await?;
        if stranded > 0 {
            tracing::warn!(
                pending_key = pending,
                stranded = stranded,
                "Pending queue holds entries from an earlier failed restore"
            );
        }

        if !self.queue.atomic_move(main, pending).await? {
            tracing::info!(main_key = main, "Nothing to flush");
            return Ok(FlushOutcome::NothingToFlush);
        }

        tracing::debug!(state = %FlushState::Moved, "Main queue moved to pending");

        let entries = self.queue.drain_all(pending).await?;
        if entries.is_empty() {
            self.queue.clear(pending).await?;
            tracing::info!(pending_key = pending, "Nothing to flush");
            return Ok(FlushOutcome::NothingToFlush);
        }

        let count = entries.len();
        let payload = entries.concat().into_bytes();
        let bytes = payload.len();
        let object_name = object_name(&self.object_prefix, &Utc::now().with_timezone(&self.offset));

        tracing::debug!(
            state = %FlushState::Uploading,
            entries = count,
            bytes = bytes,
            object = %object_name,
            "Uploading log batch"
        );

        match self.upload_with_retry(&payload, &object_name).await {
            Ok(()) => {
                if let Err(e) = self.queue.clear(pending).await {
                    tracing::error!(
                        error = %e,
                        object = %object_name,
                        entries = count,
                        "Batch uploaded but pending queue could not be cleared; it may be uploaded again"
                    );
                    return Err(e.into());
                }

                tracing::info!(
                    state = %FlushState::Confirmed,
                    entries = count,
                    bytes = bytes,
                    object = %object_name,
                    duration_ms = started.elapsed().as_millis() as u64,
                    "Log batch uploaded"
                );

                Ok(FlushOutcome::Uploaded {
                    entries: count,
                    bytes,
                    object_name,
                })
            }
            Err(upload) => {
                tracing::error!(
                    error = %upload,
                    kind = upload.kind(),
                    entries = count,
                    "Log batch upload failed, restoring entries"
                );

                match self.queue.restore_and_clear(pending, main).await {
                    Ok(()) => {
                        tracing::warn!(
                            state = %FlushState::RolledBack,
                            entries = count,
                            main_key = main,
                            "Pending entries restored to main queue"
                        );

                        Ok(FlushOutcome::RolledBack {
                            entries: count,
                            reason: upload.to_string(),
                        })
                    }
                    Err(source) => Err(FlushError::Restore {
                        entries: count,
                        upload,
                        source,
                    }),
                }
            }
        }
    }

    /// Run one cycle and log any error at the cycle boundary
    ///
    /// Never fails; used by the scheduler so a bad cycle cannot stop it.
    pub async fn run_logged(&self) -> Option<FlushOutcome> {
        let result = self.run_cycle().await;
        tracing::debug!(state = %FlushState::Idle, "Flush cycle finished");

        match result {
            Ok(outcome) => Some(outcome),
            Err(e @ FlushError::Restore { .. }) => {
                tracing::error!(
                    error = %e,
                    kind = e.kind(),
                    critical = true,
                    pending_key = %self.keys.pending,
                    "Log restore failed; entries are stranded in the pending queue until restored manually"
                );
                None
            }
            Err(e) => {
                tracing::error!(error = %e, kind = e.kind(), "Flush cycle aborted");
                None
            }
        }
    }

    /// Obtain a target and upload, up to `max_attempts` times
    async fn upload_with_retry(&self, payload: &[u8], object_name: &str) -> Result<(), UploadError> {
        let mut attempt = 1;

        loop {
            match self.upload_once(payload, object_name).await {
                Ok(()) => return Ok(()),
                Err(e) if attempt < self.policy.max_attempts => {
                    let delay = self.policy.retry_delay(attempt);
                    tracing::warn!(
                        error = %e,
                        attempt = attempt,
                        max_attempts = self.policy.max_attempts,
                        retry_in_ms = delay.as_millis() as u64,
                        "Upload attempt failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn upload_once(&self, payload: &[u8], object_name: &str) -> Result<(), UploadError> {
        let target = self.with_deadline(self.uploader.get_upload_target()).await?;
        self.with_deadline(self.uploader.upload(&target, payload.to_vec(), object_name))
            .await
    }

    async fn with_deadline<T>(
        &self,
        call: impl Future<Output = Result<T, UploadError>>,
    ) -> Result<T, UploadError> {
        tokio::time::timeout(self.policy.call_timeout, call)
            .await
            .map_err(|_| UploadError::TimedOut(self.policy.call_timeout))?
    }
}
