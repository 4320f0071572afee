//! OS signal handling.

/// Resolve when a termination signal arrives.
///
/// SIGINT and SIGTERM are both treated as a request for graceful shutdown.
#[cfg(unix)]
pub async fn terminate_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut interrupt =
        signal(SignalKind::interrupt()).expect("Failed to install SIGINT handler");
    let mut terminate =
        signal(SignalKind::terminate()).expect("Failed to install SIGTERM handler");

    tokio::select! {
        _ = interrupt.recv() => {}
        _ = terminate.recv() => {}
    }
}

#[cfg(not(unix))]
pub async fn terminate_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
}
