//! Root document.

use axum::extract::State;
use axum::http::StatusCode;
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};
use tracing::warn;

use super::AppState;

/// `GET /` serves `index.html` from the static directory. A missing file is
/// reported with the path it was expected at rather than a bare 500.
pub async fn index_handler(State(state): State<AppState>) -> Response {
    let index_path = state.static_dir.join("index.html");

    match tokio::fs::read(&index_path).await {
        Ok(body) => ([(CONTENT_TYPE, "text/html; charset=utf-8")], body).into_response(),
        Err(e) => {
            warn!("Cannot serve {}: {e}", index_path.display());
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!(
                    "index.html not found on server. Expected at: {}",
                    index_path.display()
                ),
            )
                .into_response()
        }
    }
}
