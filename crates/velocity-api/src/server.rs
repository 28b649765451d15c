//! HTTP server lifecycle.

use std::future::Future;
use std::io;
use std::net::SocketAddr;

use tokio::net::TcpListener;

use velocity_core::Result;

use crate::routes::create_router;
use crate::state::AppState;

/// Bind `addr` and serve until Ctrl-C.
pub async fn serve(addr: SocketAddr, state: AppState) -> Result<()> {
    let listener = TcpListener::bind(addr).await?;
    log::info!("velocity listening on http://{}", listener.local_addr()?);

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    log::info!("velocity server stopped");
    Ok(())
}

async fn shutdown_signal() {
    wait_for_signal(tokio::signal::ctrl_c()).await;
}

/// Resolve once `signal` fires. A handler that cannot be installed never
/// resolves, so the server keeps running instead of stopping at startup.
async fn wait_for_signal(signal: impl Future<Output = io::Result<()>>) {
    if let Err(e) = signal.await {
        log::error!("failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    log::info!("shutdown signal received");
}

// ============================================================================
// Tests
// ============================================================================
