//! Background reconcile worker
//!
//! Best-effort reverts alone do not guarantee convergence: a remote
//! mutation can fail after the user navigated away, leaving local and
//! server cart divergent. This worker closes that gap — it runs a
//! periodic `reconcile` (and the engine triggers one on every screen
//! focus via [`crate::engine::PomeloEngine::refresh`]), so the local cart
//! is guaranteed to converge to the server cart within one sync interval
//! of any missed revert.

use crate::cart::CartStore;
use crate::remote::CartRemote;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

pub struct SyncWorker {
    cart: Arc<CartStore>,
    remote: Arc<dyn CartRemote>,
    interval: Duration,
    shutdown: CancellationToken,
}

impl SyncWorker {
    pub fn new(
        cart: Arc<CartStore>,
        remote: Arc<dyn CartRemote>,
        interval: Duration,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            cart,
            remote,
            interval,
            shutdown,
        }
    }

    /// Main loop: periodic reconcile until shutdown
    pub async fn run(self) {
        tracing::info!(interval_ms = self.interval.as_millis() as u64, "Sync worker started");
        let mut ticker = tokio::time::interval(self.interval);
        // The first tick fires immediately; skip it, the engine already
        // reconciled at startup
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.sync_once().await;
                }
                _ = self.shutdown.cancelled() => {
                    break;
                }
            }
        }
        tracing::info!("Sync worker stopped");
    }

    async fn sync_once(&self) {
        match self.remote.fetch().await {
            Ok(snapshot) => {
                self.cart.reconcile(snapshot);
                tracing::debug!("Periodic cart reconcile applied");
            }
            Err(e) => {
                // Local state stays; the next tick tries again
                tracing::warn!(error = %e, "Periodic cart fetch failed");
            }
        }
    }
}
