//! WebSocket transport
//!
//! Accepts TCP connections, performs the WebSocket handshake and runs one
//! task per connection:
//! - a reader loop feeding text frames, one at a time, to the connection's
//!   `Session`
//! - a writer task draining the connection's outbound queue into the socket
//!
//! When the reader loop ends (close frame, read error, EOF) the session is
//! closed, which drops the broker's handle on the outbound queue; the writer
//! then drains what is left and shuts the socket. A failed socket write
//! ends the writer, which closes the session the same way.

use std::fmt::Display;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures_util::{Sink, SinkExt, Stream, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::spawn;
use tokio::time::sleep;
use tokio_tungstenite::accept_async;
use tracing::{debug, info, warn};
use tungstenite::protocol::Message as WsMessage;

use crate::broker::Broker;
use crate::client::Outbound;
use crate::config::BrokerSettings;
use crate::transport::session::Session;
use crate::utils::RelayError;

// Pause after a failed accept (e.g. out of file descriptors) before retrying.
const ACCEPT_RETRY_DELAY: Duration = Duration::from_millis(100);

/// Bind `addr` and serve WebSocket clients until the listener fails to bind.
pub async fn start_websocket_server(
    addr: &str,
    broker: Arc<Broker>,
    settings: BrokerSettings,
) -> Result<(), RelayError> {
    let listener = TcpListener::bind(addr).await?;
    info!("WebSocket server listening on ws://{}", listener.local_addr()?);
    serve(listener, broker, settings).await;
    Ok(())
}

/// Accept loop over an already bound listener.
pub async fn serve(listener: TcpListener, broker: Arc<Broker>, settings: BrokerSettings) {
    loop {
        let (stream, peer) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                warn!("Failed to accept connection: {e}");
                sleep(ACCEPT_RETRY_DELAY).await;
                continue;
            }
        };

        if broker.connection_count() >= settings.max_connections {
            warn!(
                "Refusing {peer}: connection limit of {} reached",
                settings.max_connections
            );
            continue;
        }

        spawn(handle_connection(
            stream,
            peer,
            broker.clone(),
            settings.outbound_queue,
        ));
    }
}

async fn handle_connection(
    stream: TcpStream,
    peer: SocketAddr,
    broker: Arc<Broker>,
    queue_capacity: usize,
) {
    let ws_stream = match accept_async(stream).await {
        Ok(ws) => ws,
        Err(e) => {
            warn!("WebSocket handshake with {peer} failed: {e}");
            return;
        }
    };

    debug!("Handshake with {peer} complete");
    let (ws_sender, ws_receiver) = ws_stream.split();
    run_connection(ws_receiver, ws_sender, broker, queue_capacity).await;
}

/// Drive one open connection until either direction stops.
///
/// The session is closed as soon as the reader ends (close frame, read
/// error, EOF) or the writer gives up after a failed write, whichever comes
/// first.
pub(crate) async fn run_connection<R, W>(
    reader: R,
    mut writer: W,
    broker: Arc<Broker>,
    queue_capacity: usize,
) where
    R: Stream<Item = Result<WsMessage, tungstenite::Error>> + Unpin,
    W: Sink<WsMessage> + Unpin + Send + 'static,
    W::Error: Display + Send,
{
    let (outbound, mut rx) = Outbound::channel(queue_capacity);
    let mut session = Session::open(broker, outbound);
    let client_id = session.id();

    let mut send_loop = spawn(async move {
        while let Some(msg) = rx.recv().await {
            if let Err(e) = writer.send(msg).await {
                debug!("Failed to send message to {client_id}: {e}");
                break;
            }
        }
        let _ = writer.close().await;
        debug!("Send loop closed for {client_id}");
    });

    tokio::select! {
        _ = read_loop(&session, reader) => {}
        _ = &mut send_loop => {
            debug!("Writer for {client_id} stopped");
        }
    }

    session.close();
    info!("{client_id} disconnected");
}

async fn read_loop<R>(session: &Session, mut reader: R)
where
    R: Stream<Item = Result<WsMessage, tungstenite::Error>> + Unpin,
{
    let client_id = session.id();
    while let Some(frame) = reader.next().await {
        match frame {
            Ok(WsMessage::Text(text)) => {
                let outcome = session.handle_text(text.as_str());
                debug!("{client_id}: {outcome:?}");
            }
            Ok(WsMessage::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                debug!("Read from {client_id} failed: {e}");
                break;
            }
        }
    }
}
