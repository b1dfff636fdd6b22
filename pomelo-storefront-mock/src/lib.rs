//! In-process mock of the Pomelo storefront API
//!
//! Serves the endpoint set the engine consumes over a loopback listener,
//! with failure-injection switches and call counters so integration tests
//! can observe the engine's remote traffic.

pub mod api;
pub mod state;

pub use api::router;
pub use state::{MockStorefront, ServerLine};

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Bind an ephemeral loopback port and serve the mock storefront on it.
///
/// Returns the bound address and the server task handle; dropping the
/// handle aborts nothing, tests should hold it for the server's lifetime.
pub async fn serve(state: Arc<MockStorefront>) -> anyhow::Result<(SocketAddr, JoinHandle<()>)> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let app = router(state);

    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!("Mock storefront server error: {e}");
        }
    });

    tracing::info!("Mock storefront listening on {addr}");
    Ok((addr, handle))
}
