//! One-shot readiness signal for the resolution session.

use std::sync::Arc;
use tokio::sync::watch;
use tracing::info;

/// Signals that the external resolution session finished its startup
/// handshake.
///
/// The gate starts closed and opens exactly once. The core only waits on it;
/// the out-of-core initialization routine calls [`signal`](Self::signal).
#[derive(Clone)]
pub struct ReadinessGate {
    tx: Arc<watch::Sender<bool>>,
}

impl ReadinessGate {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Open the gate. Returns `true` only for the call that opened it.
    pub fn signal(&self) -> bool {
        let opened = self.tx.send_if_modified(|ready| {
            if *ready {
                false
            } else {
                *ready = true;
                true
            }
        });
        if opened {
            info!("Resolution session is ready");
        }
        opened
    }

    pub fn is_ready(&self) -> bool {
        *self.tx.borrow()
    }

    /// Wait until the gate is open. Returns immediately once it is.
    pub async fn wait(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives as long as `self`, so this cannot observe a close.
        let _ = rx.wait_for(|ready| *ready).await;
    }
}

impl Default for ReadinessGate {
    fn default() -> Self {
        Self::new()
    }
}
