//! CLI for Courier
//!
//! Subcommands:
//! - `server`: run the WebSocket relay and the HTTP listener
//! - `client`: run a simple client against a running relay (smoke test)

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use courier::broker::Broker;
use courier::config::{self, Settings};
use courier::http::{AppState, start_http_server};
use courier::persistence::BlobStore;
use courier::transport::start_websocket_server;
use courier::utils::{RelayError, logging};
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "courier", version, about)]
enum Command {
    /// Start the relay
    Server {
        /// Configuration file (extension optional)
        #[arg(long = "config", default_value = config::DEFAULT_CONFIG_PATH)]
        config_path: String,
    },
    /// Run the example client (identify, subscribe, publish, print replies)
    Client {
        /// WebSocket server URL to connect to
        #[arg(long, default_value = "ws://127.0.0.1:8080")]
        url: String,
        /// Conversation to join
        #[arg(long, default_value = "room1")]
        room: String,
        /// Label sent with `identify`
        #[arg(long, default_value = "user-1")]
        user: String,
    },
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    match Command::parse() {
        Command::Server { config_path } => {
            let settings = match config::load_config_from(&config_path) {
                Ok(settings) => settings,
                Err(e) => {
                    logging::init("info");
                    error!("Failed to load configuration: {e}");
                    std::process::exit(1);
                }
            };
            logging::init(&settings.log.level);

            if let Err(e) = run_server(settings).await {
                error!("Server failed: {e}");
                std::process::exit(1);
            }
        }
        Command::Client { url, room, user } => {
            logging::init("info");
            if let Err(e) = run_client(&url, &room, &user).await {
                error!("Client failed: {e}");
                std::process::exit(1);
            }
        }
    }
}

async fn run_server(settings: Settings) -> Result<(), RelayError> {
    let broker = Arc::new(Broker::with_settings(&settings.broker));
    let blobs = BlobStore::open(&settings.http.blob_dir)?;
    let state = AppState::new(broker.clone(), blobs.clone(), &settings.http.static_dir);

    let ws_addr = settings.ws_addr();
    let http_addr = settings.http_addr();

    tokio::select! {
        res = start_websocket_server(&ws_addr, broker, settings.broker.clone()) => {
            res?;
            error!("WebSocket server exited unexpectedly.");
        }
        res = start_http_server(&http_addr, state, settings.http.max_blob_bytes) => {
            res?;
            error!("HTTP server exited unexpectedly.");
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received. Exiting gracefully.");
        }
    }

    blobs.flush()?;
    Ok(())
}

async fn run_client(url: &str, room: &str, user: &str) -> Result<(), RelayError> {
    use futures_util::{SinkExt, StreamExt};
    use serde_json::json;
    use tokio_tungstenite::connect_async;
    use tokio_tungstenite::tungstenite::Message as WsMessage;

    let (mut ws_stream, _response) = connect_async(url).await?;

    let requests = [
        json!({ "action": "identify", "userId": user }),
        json!({ "action": "subscribe", "conversationId": room }),
        json!({
            "action": "message",
            "envelope": {
                "conversationId": room,
                "senderId": user,
                "ciphertext": "aGVsbG8gZnJvbSBjb3VyaWVy",
                "sentAt": chrono::Utc::now().to_rfc3339(),
            }
        }),
    ];
    for request in requests {
        ws_stream
            .send(WsMessage::Text(request.to_string().into()))
            .await?;
    }

    // identified, history, and our own message echoed back
    for _ in 0..3 {
        match tokio::time::timeout(Duration::from_secs(5), ws_stream.next()).await {
            Ok(Some(Ok(WsMessage::Text(reply)))) => println!("{reply}"),
            Ok(Some(Ok(_))) => {}
            Ok(Some(Err(e))) => return Err(e.into()),
            Ok(None) => break,
            Err(_) => {
                info!("No more replies from {url}");
                break;
            }
        }
    }

    ws_stream.close(None).await?;
    Ok(())
}
