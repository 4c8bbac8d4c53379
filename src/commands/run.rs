use anyhow::Result;
use log_shipper::flush::FlushScheduler;
use log_shipper::signals::{setup_signal_handlers, ShutdownSignal};
use log_shipper::sink::LogSink;
use log_shipper::{config, init_tracing, init_tracing_with_sink};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{info, warn};

use super::{build_worker, open_queue};

/// Execute the run command
///
/// This will:
/// 1. Load configuration and open the queue database
/// 2. Attach the queue sink to tracing
/// 3. Spawn the flush scheduler
/// 4. Wait for SIGTERM/SIGINT, let the sink catch up, then stop the
///    scheduler (which runs the final flush)
pub async fn execute(config_path: &Path) -> Result<()> {
    let cfg = config::load_config(config_path)?;

    if !cfg.logging.ship_logs {
        init_tracing();
        warn!("Log shipping is disabled (logging.ship_logs = false); nothing to run");
        return Ok(());
    }

    let queue = open_queue(&cfg).await?;
    let keys = cfg.queue.keys();

    let writer = init_tracing_with_sink(
        LogSink::new(queue.clone(), &keys.main),
        cfg.logging.min_level()?,
        cfg.logging.offset()?,
    );

    let (_signal_tx, mut signal_rx, signal_handle) = setup_signal_handlers();

    let worker = Arc::new(build_worker(&cfg, queue.clone())?);
    let (scheduler_tx, scheduler_rx) = broadcast::channel(1);
    let scheduler = FlushScheduler::new(worker, cfg.flush.interval())
        .flush_on_shutdown(cfg.flush.flush_on_shutdown)
        .spawn(scheduler_rx);

    info!(
        database = %cfg.store.database_path,
        main_key = %keys.main,
        pending_key = %keys.pending,
        interval_secs = cfg.flush.interval_seconds,
        min_level = %cfg.logging.level,
        "Log shipper running"
    );

    let _ = signal_rx.recv().await;

    // Entries logged up to now must be in the queue before the final flush
    writer.sync().await;
    let _ = scheduler_tx.send(ShutdownSignal::Graceful);

    if let Err(e) = scheduler.await {
        warn!(error = %e, "Flush scheduler task ended abnormally");
    }
    signal_handle.abort();

    info!("Log shipper stopped");
    writer.sync().await;
    queue.close().await;

    Ok(())
}
