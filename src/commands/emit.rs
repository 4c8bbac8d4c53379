use anyhow::Result;
use log_shipper::config;
use log_shipper::sink::{LogEntry, LogSink};
use std::path::Path;

use super::open_queue;

/// Execute the emit command
///
/// Appends one entry to the main queue, formatted like any other record.
pub async fn execute(config_path: &Path, message: &str, level: &str) -> Result<()> {
    let cfg = config::load_config(config_path)?;
    let queue = open_queue(&cfg).await?;

    let level: tracing::Level = level
        .parse()
        .map_err(|_| anyhow::anyhow!("Invalid log level: {}", level))?;

    let sink = LogSink::new(queue.clone(), &cfg.queue.main_key);
    let entry = LogEntry::now(cfg.logging.offset()?, level.as_str(), message);
    sink.append(&entry).await?;
    queue.close().await;

    print!("{}", entry);
    Ok(())
}
