use anyhow::Result;
use colored::Colorize;
use log_shipper::config;
use log_shipper::queue::DurableQueue;
use std::path::Path;

use super::open_queue;

/// Execute the status command
pub async fn execute(config_path: &Path) -> Result<()> {
    let cfg = config::load_config(config_path)?;
    let queue = open_queue(&cfg).await?;
    let keys = cfg.queue.keys();

    let main_len = queue.len(&keys.main).await?;
    let pending_len = queue.len(&keys.pending).await?;
    queue.close().await;

    println!("{}", "Queue status:".bold());
    println!("  Database: {}", cfg.store.database_path);
    println!("  {} (main): {}", keys.main, main_len);

    if pending_len > 0 {
        println!(
            "  {} (pending): {} {}",
            keys.pending,
            pending_len,
            "(stranded; run `log-shipper restore` if no flush is in progress)".red()
        );
    } else {
        println!("  {} (pending): 0", keys.pending);
    }

    Ok(())
}
