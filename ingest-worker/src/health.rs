//! Health check HTTP server for the ingest worker

use std::net::SocketAddr;

use axum::{http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde_json::json;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Simple health check endpoint
async fn health() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "ingest-worker",
        })),
    )
}

/// Start the health check HTTP server
///
/// # Errors
///
/// Returns an error if the server fails to bind to the specified address
pub async fn start_health_server(shutdown_token: CancellationToken) -> anyhow::Result<()> {
    let app = Router::new().route("/health", get(health));

    let addr = SocketAddr::from((
        [0, 0, 0, 0],
        std::env::var("HEALTH_PORT").map_or(Ok(8081), |p| p.parse())?,
    ));

    let listener = TcpListener::bind(&addr).await?;
    info!("Health server listening on http://{addr}/health");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown_token.cancelled().await })
        .await
        .map_err(anyhow::Error::from)
}
