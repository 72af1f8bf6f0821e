//! Shutdown Coordinator (C9): on termination signal, concurrently stop
//! every registered backend and wait for exit. Per-server failures are
//! logged and never block the others (§4.7, §9).

use crate::facade::Gateway;

/// Take a snapshot of currently registered server-ids and stop each
/// concurrently. Returns once every stop has completed or failed.
pub async fn shutdown_all(gateway: &Gateway) {
    let ids = gateway.server_ids();
    let handles: Vec<_> = ids
        .into_iter()
        .map(|id| {
            let gateway = gateway.clone();
            tokio::spawn(async move {
                if let Err(e) = gateway.stop_server(&id).await {
                    eprintln!("[shutdown] server '{}' failed to stop cleanly: {}", id, e);
                }
            })
        })
        .collect();

    for handle in handles {
        let _ = handle.await;
    }
}

/// Block until a termination signal (Ctrl-C or SIGTERM) arrives, then drive
/// the shutdown fan-out. Used by the `serve` binary entry point (§6).
pub async fn wait_for_signal_and_shutdown(gateway: &Gateway) {
    wait_for_termination_signal().await;
    eprintln!("[shutdown] termination signal received, stopping all servers");
    shutdown_all(gateway).await;
}

#[cfg(unix)]
async fn wait_for_termination_signal() {
    use tokio::signal::unix::{signal, SignalKind};
    let mut sigterm = signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = sigterm.recv() => {}
    }
}

#[cfg(not(unix))]
async fn wait_for_termination_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
