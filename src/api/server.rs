use crate::api::routes;
use crate::api::state::AppState;
use log::info;
use std::net::SocketAddr;
use tokio::net::TcpListener;

/// Serve until Ctrl-C.
pub async fn serve(addr: SocketAddr, state: AppState) -> Result<(), String> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| format!("Binding {} failed: {}", addr, e))?;
    let local = listener
        .local_addr()
        .map_err(|e| format!("Reading listener address failed: {}", e))?;
    info!("HTTP API listening on http://{}", local);

    axum::serve(listener, routes::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| format!("HTTP server failed: {}", e))?;
    info!("HTTP API stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    }
}
