//! Command implementations for the CLI
//!
//! This module contains the implementation of all CLI commands:
//! - run: Buffer logs and flush them periodically
//! - flush: Run a single flush cycle
//! - status: Show queue sizes
//! - restore: Recover entries stranded in the pending queue
//! - emit: Append a single entry
//! - config: Configuration display and validation

pub mod config;
pub mod emit;
pub mod flush;
pub mod restore;
pub mod run;
pub mod status;

use anyhow::{Context, Result};
use log_shipper::config::Config;
use log_shipper::flush::FlushWorker;
use log_shipper::queue::SqliteQueue;
use log_shipper::uploader::B2Uploader;
use std::sync::Arc;

/// Open the durable queue described by the store section
pub(crate) async fn open_queue(cfg: &Config) -> Result<Arc<SqliteQueue>> {
    let queue = SqliteQueue::from_config(&cfg.store)
        .await
        .with_context(|| format!("Failed to open queue database {}", cfg.store.database_path))?;

    Ok(Arc::new(queue))
}

/// Build a flush worker wired to the B2 uploader
pub(crate) fn build_worker(cfg: &Config, queue: Arc<SqliteQueue>) -> Result<FlushWorker> {
    let uploader = B2Uploader::new(&cfg.uploader).context("Failed to create B2 HTTP client")?;

    Ok(FlushWorker::from_config(
        queue,
        Arc::new(uploader),
        cfg.queue.keys(),
        &cfg.flush,
        &cfg.uploader,
        cfg.logging.offset()?,
    ))
}
