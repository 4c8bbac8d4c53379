use anyhow::Result;
use colored::Colorize;
use log_shipper::config;
use log_shipper::queue::DurableQueue;
use std::path::Path;
use tracing::info;

use super::open_queue;

/// Execute the restore command
///
/// Manual recovery after a failed rollback: appends the pending queue to
/// main and deletes it, exactly as the automatic rollback would.
pub async fn execute(config_path: &Path) -> Result<()> {
    let cfg = config::load_config(config_path)?;
    let queue = open_queue(&cfg).await?;
    let keys = cfg.queue.keys();

    let pending_len = queue.len(&keys.pending).await?;
    if pending_len == 0 {
        println!("{}", "Pending queue is empty; nothing to restore".yellow());
        queue.close().await;
        return Ok(());
    }

    queue.restore_and_clear(&keys.pending, &keys.main).await?;
    queue.close().await;

    info!(entries = pending_len, "Pending entries restored manually");
    println!(
        "{} {} entries from '{}' to '{}'",
        "✓ Restored".green(),
        pending_len,
        keys.pending,
        keys.main
    );

    Ok(())
}
