//! Shutdown coordination.

use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;

/// Coordinator for graceful shutdown.
///
/// Provides a broadcast channel that the serve loop and the grace watchdog
/// subscribe to; triggering it starts the drain.
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    /// Create a new shutdown coordinator.
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// Subscribe to the shutdown signal.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Trigger the shutdown signal.
    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Bound the drain with the configured grace time.
///
/// Once a shutdown has been triggered, the watchdog waits out the grace
/// period and then terminates the process forcefully. The caller aborts the
/// watchdog when the drain completes in time.
pub fn spawn_grace_watchdog(
    mut shutdown_rx: broadcast::Receiver<()>,
    grace: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        if shutdown_rx.recv().await.is_ok() {
            tokio::time::sleep(grace).await;
            tracing::error!(
                grace_secs = grace.as_secs_f64(),
                "Could not shutdown gracefully within grace time, forcing exit"
            );
            std::process::exit(1);
        }
    })
}
