//! Health check endpoint.

use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};

use super::AppState;

/// Health status response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
    /// Live WebSocket connections.
    pub connections: usize,
    /// Topics seen since startup.
    pub topics: usize,
    pub blobs: usize,
    pub uptime_seconds: u64,
}

/// Health check handler.
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        connections: state.broker.connection_count(),
        topics: state.broker.topic_count(),
        blobs: state.blobs.len(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
    })
}
