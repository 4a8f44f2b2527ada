use std::fmt;

use tokio::sync::mpsc::{self, Receiver, Sender, error::TrySendError};
use tungstenite::protocol::Message as WsMessage;
use uuid::Uuid;

/// Identity of a connection. Two handles are the same connection iff their
/// ids are equal; labels play no part in identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "client-{}", self.0)
    }
}

/// Why a frame could not be queued for a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SendFailure {
    #[error("outbound queue is full")]
    Full,
    #[error("connection is closed")]
    Closed,
}

/// Sending half of a connection's outbound queue.
///
/// Pushing never waits: a slow reader fills its own queue and starts failing
/// deliveries instead of stalling the publisher.
#[derive(Debug, Clone)]
pub struct Outbound {
    sender: Sender<WsMessage>,
}

impl Outbound {
    /// Create a queue holding at most `capacity` frames (minimum 1). The
    /// receiver is drained by the connection's socket writer.
    pub fn channel(capacity: usize) -> (Self, Receiver<WsMessage>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Self { sender }, receiver)
    }

    pub fn push(&self, msg: WsMessage) -> Result<(), SendFailure> {
        self.sender.try_send(msg).map_err(|e| match e {
            TrySendError::Full(_) => SendFailure::Full,
            TrySendError::Closed(_) => SendFailure::Closed,
        })
    }

    /// True once the writer has gone away.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

/// Represents a connected WebSocket client.
#[derive(Debug)]
pub struct Connection {
    /// Unique identifier for the connection.
    pub id: ConnectionId,

    /// User label from the most recent `identify`, if any. Unverified.
    pub label: Option<String>,

    /// Queue of frames waiting to be written to the socket.
    pub outbound: Outbound,
}

impl Connection {
    pub fn new(outbound: Outbound) -> Self {
        Self {
            id: ConnectionId::new(),
            label: None,
            outbound,
        }
    }
}
