use super::blobs::BlobReceipt;
use super::{AppState, HealthStatus, build_router};
use crate::broker::Broker;
use crate::client::Outbound;
use crate::persistence::BlobStore;
use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

const LIMIT: usize = 1024;

fn test_app(static_dir: &Path) -> (Router, Arc<Broker>) {
    let broker = Arc::new(Broker::new());
    let blobs = BlobStore::temporary().unwrap();
    let state = AppState::new(broker.clone(), blobs, static_dir);
    (build_router(state, LIMIT), broker)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Vec<u8>) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec())
}

async fn upload(app: &Router, bytes: Vec<u8>) -> (StatusCode, Vec<u8>) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/blobs")
                .body(Body::from(bytes))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec())
}

#[tokio::test]
async fn index_is_served_when_present() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("index.html"), "<h1>chat</h1>").unwrap();
    let (app, _) = test_app(dir.path());

    let (status, body) = get(&app, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"<h1>chat</h1>");
}

#[tokio::test]
async fn missing_index_names_expected_location() {
    let dir = TempDir::new().unwrap();
    let (app, _) = test_app(dir.path());

    let (status, body) = get(&app, "/").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let text = String::from_utf8(body).unwrap();
    let expected = dir.path().join("index.html");
    assert_eq!(
        text,
        format!(
            "index.html not found on server. Expected at: {}",
            expected.display()
        )
    );
}

#[tokio::test]
async fn static_files_are_served() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("app.js"), "console.log(1)").unwrap();
    let (app, _) = test_app(dir.path());

    let (status, body) = get(&app, "/static/app.js").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"console.log(1)");

    let (status, _) = get(&app, "/static/missing.js").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn blob_upload_then_download() {
    let dir = TempDir::new().unwrap();
    let (app, _) = test_app(dir.path());

    let (status, body) = upload(&app, b"\x01\x02opaque".to_vec()).await;
    assert_eq!(status, StatusCode::CREATED);
    let receipt: BlobReceipt = serde_json::from_slice(&body).unwrap();
    assert_eq!(receipt.path, format!("/blobs/{}", receipt.name));

    let (status, body) = get(&app, &receipt.path).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"\x01\x02opaque");
}

#[tokio::test]
async fn unknown_blob_is_404() {
    let dir = TempDir::new().unwrap();
    let (app, _) = test_app(dir.path());

    let (status, _) = get(&app, "/blobs/does-not-exist").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn empty_and_oversized_uploads_are_rejected() {
    let dir = TempDir::new().unwrap();
    let (app, _) = test_app(dir.path());

    let (status, _) = upload(&app, Vec::new()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = upload(&app, vec![0u8; LIMIT + 1]).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn health_reports_broker_counts() {
    let dir = TempDir::new().unwrap();
    let (app, broker) = test_app(dir.path());
    let (outbound, _rx) = Outbound::channel(4);
    let id = broker.connect(outbound);
    broker.subscribe(&id, "room1");

    let (status, body) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    let health: HealthStatus = serde_json::from_slice(&body).unwrap();
    assert_eq!(health.status, "ok");
    assert_eq!(health.connections, 1);
    assert_eq!(health.topics, 1);
    assert_eq!(health.blobs, 0);
}
