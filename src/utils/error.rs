//! Error types for `courier`.
//!
//! Only process-level failures (binding a listener, opening the blob store,
//! loading configuration) travel through these types. Per-message protocol
//! problems are dropped inside the session handler and never become errors.

/// Top-level error for server startup and the smoke-test client.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// Configuration could not be loaded or deserialized.
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Blob storage failure.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// WebSocket client failure.
    #[error("websocket error: {0}")]
    WebSocket(#[from] tungstenite::Error),

    /// I/O error, typically a listener that failed to bind.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Blob store errors.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Underlying sled failure.
    #[error("database error: {0}")]
    Database(#[from] sled::Error),

    /// No blob is stored under the requested name.
    #[error("blob not found: {0}")]
    NotFound(String),

    /// Uploads must carry at least one byte.
    #[error("empty blob")]
    Empty,
}
