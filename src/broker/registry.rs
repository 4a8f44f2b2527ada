//! Connection registry
//!
//! Tracks every live connection together with its optional user label. The
//! registry owns each `Connection` (and therefore its outbound queue) from
//! handshake until cleanup.

use std::collections::HashMap;

use crate::client::{Connection, ConnectionId};

#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    connections: HashMap<ConnectionId, Connection>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, connection: Connection) {
        self.connections.insert(connection.id, connection);
    }

    /// Attach or overwrite the label of a registered connection. Returns
    /// `false` (and changes nothing) for unknown connections.
    pub fn set_label(&mut self, id: &ConnectionId, label: Option<String>) -> bool {
        match self.connections.get_mut(id) {
            Some(connection) => {
                connection.label = label;
                true
            }
            None => false,
        }
    }

    /// Remove a connection. Purging twice is a no-op.
    pub fn purge(&mut self, id: &ConnectionId) -> Option<Connection> {
        self.connections.remove(id)
    }

    pub fn get(&self, id: &ConnectionId) -> Option<&Connection> {
        self.connections.get(id)
    }

    pub fn contains(&self, id: &ConnectionId) -> bool {
        self.connections.contains_key(id)
    }

    pub fn label_of(&self, id: &ConnectionId) -> Option<&str> {
        self.connections.get(id).and_then(|c| c.label.as_deref())
    }

    pub(crate) fn len(&self) -> usize {
        self.connections.len()
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }
}
