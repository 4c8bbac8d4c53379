use anyhow::Result;
use colored::Colorize;
use log_shipper::config;
use log_shipper::flush::FlushOutcome;
use std::path::Path;

use super::{build_worker, open_queue};

/// Execute the flush command
///
/// Runs exactly one cycle; a cycle that ends in a failed restore or an
/// unavailable store exits with an error.
pub async fn execute(config_path: &Path) -> Result<()> {
    let cfg = config::load_config(config_path)?;
    let queue = open_queue(&cfg).await?;
    let worker = build_worker(&cfg, queue.clone())?;

    let result = worker.run_cycle().await;
    queue.close().await;

    match result? {
        FlushOutcome::NothingToFlush => {
            println!("{}", "Nothing to flush".yellow());
        }
        FlushOutcome::Uploaded {
            entries,
            bytes,
            object_name,
        } => {
            println!(
                "{} {} entries ({} bytes) → {}",
                "✓ Uploaded".green(),
                entries,
                bytes,
                object_name
            );
        }
        FlushOutcome::RolledBack { entries, reason } => {
            println!(
                "{} {} entries restored to '{}': {}",
                "✗ Upload failed,".red(),
                entries,
                cfg.queue.main_key,
                reason
            );
        }
    }

    Ok(())
}
