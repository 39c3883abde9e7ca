mod room;
mod signaling;

pub use room::{JoinOutcome, PeerSender, RoomRegistry};
pub use signaling::{ws_handler, RelayService};

use axum::routing::get;
use axum::Router;
use std::net::SocketAddr;
use tracing::info;

/// Build the relay's HTTP router: a single WebSocket endpoint at `/ws`.
pub fn router(service: RelayService) -> Router {
    Router::new()
        .route("/ws", get(ws_handler))
        .with_state(service)
}

/// Bind the relay and serve it on a background task, returning the bound
/// address. Used for embedding (`host` mode) and by the integration tests,
/// which bind port 0.
pub async fn spawn(addr: SocketAddr, service: RelayService) -> anyhow::Result<SocketAddr> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let local = listener.local_addr()?;
    let app = router(service);
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!("Relay server error: {}", e);
        }
    });
    info!("Signaling relay listening on {}", local);
    Ok(local)
}

/// Bind and serve the relay until the task is cancelled.
pub async fn serve(addr: SocketAddr, service: RelayService) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Signaling relay listening on {}", listener.local_addr()?);
    axum::serve(listener, router(service)).await?;
    Ok(())
}
