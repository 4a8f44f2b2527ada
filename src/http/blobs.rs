//! Blob upload and download.

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use super::AppState;
use crate::utils::StorageError;

/// Returned by a successful upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlobReceipt {
    pub name: String,
    /// Path the blob can be fetched from.
    pub path: String,
}

/// `POST /blobs` stores the raw request body.
pub async fn upload_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<BlobReceipt>), StorageError> {
    let name = state.blobs.put(&body)?;
    debug!("Stored blob {name} ({} bytes)", body.len());

    let path = format!("/blobs/{name}");
    Ok((StatusCode::CREATED, Json(BlobReceipt { name, path })))
}

/// `GET /blobs/{name}` returns the stored bytes.
pub async fn download_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Response, StorageError> {
    let bytes = state.blobs.get(&name)?;
    Ok(([(CONTENT_TYPE, "application/octet-stream")], bytes).into_response())
}

impl IntoResponse for StorageError {
    fn into_response(self) -> Response {
        let status = match &self {
            StorageError::NotFound(_) => StatusCode::NOT_FOUND,
            StorageError::Empty => StatusCode::BAD_REQUEST,
            StorageError::Database(e) => {
                error!("Blob storage failure: {e}");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, self.to_string()).into_response()
    }
}
