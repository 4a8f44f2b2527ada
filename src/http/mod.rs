//! HTTP endpoints served next to the WebSocket relay.
//!
//! Serves the frontend (root document and static files), stores and returns
//! opaque blobs, and reports health.

pub mod assets;
pub mod blobs;
pub mod health;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::broker::Broker;
use crate::persistence::BlobStore;
use crate::utils::RelayError;

pub use health::HealthStatus;

/// Shared state accessible from handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    pub broker: Arc<Broker>,
    pub blobs: BlobStore,
    /// Directory holding `index.html` and everything under `/static/`.
    pub static_dir: PathBuf,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(broker: Arc<Broker>, blobs: BlobStore, static_dir: impl Into<PathBuf>) -> Self {
        Self {
            broker,
            blobs,
            static_dir: static_dir.into(),
            start_time: Instant::now(),
        }
    }
}

/// Build the HTTP router with all endpoints.
pub fn build_router(state: AppState, max_blob_bytes: usize) -> Router {
    let static_files = ServeDir::new(&state.static_dir);

    Router::new()
        .route("/", get(assets::index_handler))
        .route("/health", get(health::health_handler))
        .route("/blobs", post(blobs::upload_handler))
        .route("/blobs/{name}", get(blobs::download_handler))
        .nest_service("/static", static_files)
        .layer(DefaultBodyLimit::max(max_blob_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind `addr` and serve the router until the listener fails.
pub async fn start_http_server(
    addr: &str,
    state: AppState,
    max_blob_bytes: usize,
) -> Result<(), RelayError> {
    let listener = TcpListener::bind(addr).await?;
    info!("HTTP server listening on http://{}", listener.local_addr()?);
    axum::serve(listener, build_router(state, max_blob_bytes)).await?;
    Ok(())
}

#[cfg(test)]
mod tests;
