//! Wire records exchanged with clients.
//!
//! Every record is a JSON object discriminated by its `action` field.
//! Inbound parsing is lenient: optional fields that are missing or `null`
//! deserialize to `None` and are judged by the session handler, while
//! anything that does not fit these shapes (bad JSON, unknown action, wrong
//! field types) fails to parse and is dropped by the caller.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tungstenite::protocol::Message as WsMessage;

use crate::broker::envelope::Envelope;

#[derive(Debug, Deserialize, Serialize)]
#[serde(tag = "action")]
pub enum ClientMessage {
    #[serde(rename = "identify")]
    Identify {
        #[serde(rename = "userId", default)]
        user_id: Option<Value>,
    },
    #[serde(rename = "subscribe")]
    Subscribe {
        #[serde(rename = "conversationId", default)]
        conversation_id: Option<String>,
    },
    #[serde(rename = "unsubscribe")]
    Unsubscribe {
        #[serde(rename = "conversationId", default)]
        conversation_id: Option<String>,
    },
    #[serde(rename = "message")]
    Message {
        #[serde(default)]
        envelope: Option<Value>,
    },
}

impl ClientMessage {
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "action")]
pub enum ServerMessage {
    #[serde(rename = "identified")]
    Identified {
        #[serde(rename = "userId")]
        user_id: Option<Value>,
    },
    #[serde(rename = "history")]
    History {
        #[serde(rename = "conversationId")]
        conversation_id: String,
        history: Vec<Envelope>,
    },
    #[serde(rename = "message")]
    Message { envelope: Envelope },
}

impl ServerMessage {
    /// Encode as a text frame.
    pub fn to_frame(&self) -> Result<WsMessage, serde_json::Error> {
        serde_json::to_string(self).map(WsMessage::text)
    }
}
