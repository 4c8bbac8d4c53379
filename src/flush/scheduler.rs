//! Background flush loop
//!
//! Sleeps for the interval, runs one cycle to completion, and sleeps again;
//! cycles can never overlap. Shutdown is observed between cycles, and a
//! running cycle is bounded by the worker's per-call deadlines.

use super::worker::FlushWorker;
use crate::signals::ShutdownSignal;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

pub struct FlushScheduler {
    worker: Arc<FlushWorker>,
    interval: Duration,
    flush_on_shutdown: bool,
}

impl FlushScheduler {
    pub fn new(worker: Arc<FlushWorker>, interval: Duration) -> Self {
        Self {
            worker,
            interval,
            flush_on_shutdown: true,
        }
    }

    /// Run one last cycle after the shutdown signal (default: on)
    pub fn flush_on_shutdown(mut self, enabled: bool) -> Self {
        self.flush_on_shutdown = enabled;
        self
    }

    /// Spawn the scheduler task
    ///
    /// The task ends after a shutdown signal, or when every sender of the
    /// shutdown channel has been dropped.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let (_shutdown_tx, shutdown_rx, _) = setup_signal_handlers();
    /// let handle = FlushScheduler::new(worker, Duration::from_secs(3600)).spawn(shutdown_rx);
    /// ```
    pub fn spawn(self, shutdown: broadcast::Receiver<ShutdownSignal>) -> JoinHandle<()> {
        tokio::spawn(async move {
            self.run(shutdown).await;
        })
    }

    async fn run(self, mut shutdown: broadcast::Receiver<ShutdownSignal>) {
        tracing::info!(
            interval_secs = self.interval.as_secs(),
            main_key = %self.worker.keys().main,
            "Flush scheduler started"
        );

        loop {
            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {
                    self.worker.run_logged().await;
                }
                _ = shutdown.recv() => {
                    tracing::info!("Flush scheduler received shutdown signal");
                    break;
                }
            }
        }

        if self.flush_on_shutdown {
            tracing::info!("Running final flush before shutdown");
            self.worker.run_logged().await;
        }

        tracing::info!("Flush scheduler stopped");
    }
}
