use tokio::sync::broadcast;
use tracing::{error, info};

#[cfg(unix)]
use tokio::signal::unix::{signal, SignalKind};

/// Shutdown signal types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownSignal {
    /// Graceful shutdown (finish the running cycle, final flush)
    Graceful,
}

/// Setup signal handlers
///
/// Returns the broadcast sender for shutdown signals, a receiver subscribed
/// before the signal task starts, and a join handle for that task
///
/// Handles:
/// - SIGTERM/SIGINT: Graceful shutdown
#[cfg(unix)]
pub fn setup_signal_handlers() -> (
    broadcast::Sender<ShutdownSignal>,
    broadcast::Receiver<ShutdownSignal>,
    tokio::task::JoinHandle<()>,
) {
    // Subscribed before the signal task is spawned
    let (shutdown_tx, shutdown_rx) = broadcast::channel(16);
    let tx_clone = shutdown_tx.clone();

    let handle = tokio::spawn(async move {
        let (mut sigterm, mut sigint) =
            match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
                (Ok(sigterm), Ok(sigint)) => (sigterm, sigint),
                (Err(e), _) | (_, Err(e)) => {
                    error!("Failed to setup signal handlers: {}", e);
                    wait_for_ctrl_c(&tx_clone).await;
                    return;
                }
            };

        tokio::select! {
            _ = sigterm.recv() => {
                info!("SIGTERM received, initiating graceful shutdown");
            }
            _ = sigint.recv() => {
                info!("SIGINT received, initiating graceful shutdown");
            }
        }

        let _ = tx_clone.send(ShutdownSignal::Graceful);
    });

    (shutdown_tx, shutdown_rx, handle)
}

/// Windows placeholder - only Ctrl+C is supported
#[cfg(not(unix))]
pub fn setup_signal_handlers() -> (
    broadcast::Sender<ShutdownSignal>,
    broadcast::Receiver<ShutdownSignal>,
    tokio::task::JoinHandle<()>,
) {
    // Subscribed before the signal task is spawned
    let (shutdown_tx, shutdown_rx) = broadcast::channel(16);
    let tx_clone = shutdown_tx.clone();

    let handle = tokio::spawn(async move {
        wait_for_ctrl_c(&tx_clone).await;
    });

    (shutdown_tx, shutdown_rx, handle)
}

async fn wait_for_ctrl_c(tx: &broadcast::Sender<ShutdownSignal>) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            info!("Ctrl+C received, initiating shutdown");
            let _ = tx.send(ShutdownSignal::Graceful);
        }
        Err(e) => {
            error!("Failed to listen for Ctrl+C: {}", e);
        }
    }
}
