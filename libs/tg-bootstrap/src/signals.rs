use std::io;

use tokio::signal;
use tokio_util::sync::CancellationToken;

/// Wait for Ctrl+C or, on unix, SIGTERM. Returns the name of the signal.
///
/// # Errors
/// Returns an error if a signal handler cannot be installed.
pub async fn wait_for_shutdown() -> io::Result<&'static str> {
    #[cfg(unix)]
    let mut sigterm = signal::unix::signal(signal::unix::SignalKind::terminate())?;

    #[cfg(unix)]
    let terminate = async move {
        sigterm.recv().await;
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let name = tokio::select! {
        res = signal::ctrl_c() => {
            res?;
            "ctrl_c"
        }
        () = terminate => "sigterm",
    };

    tracing::info!(signal = name, "Shutdown signal received, initiating graceful shutdown");
    Ok(name)
}

/// Spawn a task that cancels `cancel` on the first termination signal.
pub fn cancel_on_signal(cancel: CancellationToken) {
    tokio::spawn(async move {
        if let Err(e) = wait_for_shutdown().await {
            tracing::error!(error = %e, "Failed to install signal handlers, waiting for Ctrl+C only");
            let _ = signal::ctrl_c().await;
        }
        cancel.cancel();
    });
}
