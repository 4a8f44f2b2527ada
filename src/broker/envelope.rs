//! Opaque envelopes.
//!
//! An envelope is whatever JSON object a client published. The relay reads
//! two routing fields, `conversationId` and `senderId`, and preserves every
//! field (including their order) verbatim. Ciphertext, IVs and any other
//! payload stay uninterpreted.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Envelope(Map<String, Value>);

impl Envelope {
    /// Wrap a JSON value. Only objects are envelopes.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(fields) => Some(Self(fields)),
            _ => None,
        }
    }

    /// Topic this envelope is addressed to; `None` when missing, empty or
    /// not a string.
    pub fn conversation_id(&self) -> Option<&str> {
        self.0
            .get("conversationId")
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
    }

    pub fn sender_id(&self) -> Option<&str> {
        self.0.get("senderId").and_then(Value::as_str)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }
}
