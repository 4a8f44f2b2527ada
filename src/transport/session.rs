//! Per-connection session protocol handler.
//!
//! A `Session` exists while its connection is `Open`: it is created once the
//! WebSocket handshake completes (registering the connection) and handles one
//! inbound text frame at a time. Closing it, explicitly or by dropping it,
//! unsubscribes the connection everywhere and purges it from the registry
//! exactly once, whatever path ended the connection.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use crate::broker::{Broker, Envelope};
use crate::client::{ConnectionId, Outbound};
use crate::transport::message::{ClientMessage, ServerMessage};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Open,
    Closed,
}

/// What a single inbound frame amounted to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Identified,
    Subscribed { history: usize },
    Unsubscribed,
    Published { delivered: usize, evicted: usize },
    /// Malformed, unknown or incomplete input, silently ignored.
    Discarded,
}

#[derive(Debug)]
pub struct Session {
    broker: Arc<Broker>,
    id: ConnectionId,
    outbound: Outbound,
    state: SessionState,
}

impl Session {
    /// Register a freshly accepted connection with the broker.
    pub fn open(broker: Arc<Broker>, outbound: Outbound) -> Self {
        let id = broker.connect(outbound.clone());
        Self {
            broker,
            id,
            outbound,
            state: SessionState::Open,
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Handle one inbound text frame.
    pub fn handle_text(&self, text: &str) -> Outcome {
        if self.state == SessionState::Closed {
            return Outcome::Discarded;
        }

        let msg = match ClientMessage::parse(text) {
            Ok(msg) => msg,
            Err(err) => {
                debug!(
                    "Ignoring invalid message from {}: {err} | {}",
                    self.id,
                    text.chars().take(100).collect::<String>()
                );
                return Outcome::Discarded;
            }
        };

        match msg {
            ClientMessage::Identify { user_id } => self.identify(user_id),
            ClientMessage::Subscribe { conversation_id } => match non_empty(conversation_id) {
                Some(topic) => self
                    .broker
                    .subscribe(&self.id, &topic)
                    .map_or(Outcome::Discarded, |history| Outcome::Subscribed { history }),
                None => Outcome::Discarded,
            },
            ClientMessage::Unsubscribe { conversation_id } => match non_empty(conversation_id) {
                Some(topic) => {
                    self.broker.unsubscribe(&self.id, &topic);
                    Outcome::Unsubscribed
                }
                None => Outcome::Discarded,
            },
            ClientMessage::Message { envelope } => {
                let Some(envelope) = envelope.and_then(Envelope::from_value) else {
                    return Outcome::Discarded;
                };
                match self.broker.publish(envelope) {
                    Some(delivery) => Outcome::Published {
                        delivered: delivery.delivered,
                        evicted: delivery.evicted.len(),
                    },
                    None => Outcome::Discarded,
                }
            }
        }
    }

    fn identify(&self, user_id: Option<Value>) -> Outcome {
        self.broker.identify(&self.id, user_id.as_ref().map(label_of));

        let reply = ServerMessage::Identified { user_id };
        match reply.to_frame() {
            Ok(frame) => {
                if let Err(e) = self.outbound.push(frame) {
                    warn!("Could not acknowledge identify for {}: {e}", self.id);
                }
            }
            Err(e) => warn!("Failed to serialize identify ack for {}: {e}", self.id),
        }
        Outcome::Identified
    }

    /// Terminal cleanup. Only the first call has any effect.
    pub fn close(&mut self) {
        if self.state == SessionState::Closed {
            return;
        }
        self.state = SessionState::Closed;
        self.broker.disconnect(&self.id);
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.close();
    }
}

/// Strings label a connection as-is; any other JSON value by its JSON text.
fn label_of(user_id: &Value) -> String {
    match user_id {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
