//! Startup handshake with the link-resolution automation service.

use dmm_core::resolution::ReadinessGate;
use dmm_sdk::client::ResolverClient;
use std::time::Duration;
use tokio::sync::watch;

/// Poll the service's readiness endpoint until it reports ready, then open
/// the gate. Gives up silently when shutdown is signaled first.
pub async fn await_resolver_ready(
    client: ResolverClient,
    gate: ReadinessGate,
    poll_interval: Duration,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    tracing::info!("Waiting for the link resolution service to become ready");

    loop {
        match client.ready().await {
            Ok(true) => {
                gate.signal();
                return;
            }
            Ok(false) => tracing::debug!("Link resolution service not ready yet"),
            Err(e) => tracing::warn!(error = %e, "Readiness check failed"),
        }

        tokio::select! {
            biased;
            _ = shutdown_rx.wait_for(|stop| *stop) => {
                tracing::debug!("Readiness handshake cancelled by shutdown");
                return;
            }
            _ = tokio::time::sleep(poll_interval) => {}
        }
    }
}
