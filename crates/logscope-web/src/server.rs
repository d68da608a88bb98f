//! Server startup and shutdown.

use std::net::SocketAddr;

use tokio::net::TcpListener;
use tracing::info;

use crate::error::WebError;
use crate::routes::create_router;
use crate::state::AppState;

/// Serve the web interface until the process is stopped.
///
/// # Errors
///
/// Returns an error if binding to the address fails.
pub async fn serve(state: AppState, addr: SocketAddr) -> Result<(), WebError> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| WebError::Bind(addr, e))?;

    info!(addr = %addr, "listening");

    axum::serve(listener, create_router(state))
        .await
        .map_err(|e| WebError::Internal(e.to_string()))?;

    Ok(())
}

/// Serve the web interface until the shutdown future completes.
///
/// # Errors
///
/// Returns an error if binding to the address fails.
pub async fn serve_with_shutdown<F>(
    state: AppState,
    addr: SocketAddr,
    shutdown: F,
) -> Result<(), WebError>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| WebError::Bind(addr, e))?;

    info!(addr = %addr, "listening");

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| WebError::Internal(e.to_string()))?;

    info!("server shut down");
    Ok(())
}
