//! Broker engine
//!
//! The `Broker` owns the connection registry, the topic directory and the
//! history store behind a single lock and is shared between connection tasks
//! as `Arc<Broker>`.
//!
//! Concurrency and ordering notes:
//! - Every operation is one critical section. Nothing inside a critical
//!   section waits on I/O: frames are pushed onto bounded per-connection
//!   queues with `try_send`, and each connection's writer task does the
//!   socket writes.
//! - `publish` appends and fans out under the same lock, so for any topic
//!   the delivery order seen by subscribers equals the history order.
//! - `subscribe` records the subscription, snapshots the history and queues
//!   the `history` reply under the same lock. A concurrent publish is
//!   therefore either in the snapshot or delivered live after it, never both
//!   and never neither.

use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{debug, error, info, warn};

use crate::broker::envelope::Envelope;
use crate::broker::fanout::{self, Delivery};
use crate::broker::history::HistoryStore;
use crate::broker::registry::ConnectionRegistry;
use crate::broker::topic::TopicDirectory;
use crate::client::{Connection, ConnectionId, Outbound};
use crate::config::BrokerSettings;
use crate::transport::message::ServerMessage;

#[derive(Debug, Default)]
struct BrokerState {
    registry: ConnectionRegistry,
    directory: TopicDirectory,
    history: HistoryStore,
}

#[derive(Debug, Default)]
pub struct Broker {
    state: Mutex<BrokerState>,
}

impl Broker {
    /// A broker that keeps every envelope for the life of the process.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: &BrokerSettings) -> Self {
        Self {
            state: Mutex::new(BrokerState {
                history: HistoryStore::with_limit(settings.max_history_per_topic),
                ..BrokerState::default()
            }),
        }
    }

    // Each critical section leaves the state consistent, so a poisoned lock
    // is safe to keep using.
    fn state(&self) -> MutexGuard<'_, BrokerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a new connection whose frames go to `outbound`.
    pub fn connect(&self, outbound: Outbound) -> ConnectionId {
        let connection = Connection::new(outbound);
        let id = connection.id;
        let mut state = self.state();
        state.registry.register(connection);
        info!("{id} connected ({} live)", state.registry.len());
        id
    }

    /// Attach or overwrite the user label. Returns `false` for unknown connections.
    pub fn identify(&self, id: &ConnectionId, label: Option<String>) -> bool {
        let mut state = self.state();
        let known = state.registry.set_label(id, label);
        if known {
            debug!("{id} identified as {:?}", state.registry.label_of(id));
        }
        known
    }

    /// Subscribe `id` to `topic` and queue the topic's history to it.
    ///
    /// Returns the number of envelopes in the history reply, or `None` when
    /// the connection is unknown or its queue refused the reply; in the
    /// latter case the subscription is rolled back so the client never sees
    /// live traffic without the history preceding it.
    pub fn subscribe(&self, id: &ConnectionId, topic: &str) -> Option<usize> {
        let mut state = self.state();
        let outbound = state.registry.get(id)?.outbound.clone();

        let newly = state.directory.subscribe(topic, *id);
        let history = state.history.history_of(topic);
        let count = history.len();

        let reply = ServerMessage::History {
            conversation_id: topic.to_string(),
            history,
        };
        let pushed = match reply.to_frame() {
            Ok(frame) => outbound.push(frame).map_err(|e| e.to_string()),
            Err(e) => {
                error!("Failed to serialize history of {topic}: {e}");
                Err(e.to_string())
            }
        };

        match pushed {
            Ok(()) => {
                debug!("{id} subscribed to {topic} ({count} envelopes of history)");
                Some(count)
            }
            Err(e) => {
                warn!("Could not send history of {topic} to {id}: {e}");
                if newly {
                    state.directory.unsubscribe(topic, id);
                }
                None
            }
        }
    }

    /// Remove one subscription; returns whether it existed.
    pub fn unsubscribe(&self, id: &ConnectionId, topic: &str) -> bool {
        let removed = self.state().directory.unsubscribe(topic, id);
        if removed {
            debug!("{id} unsubscribed from {topic}");
        }
        removed
    }

    /// Store `envelope` in its topic's history and fan it out.
    ///
    /// Returns `None` when the envelope carries no usable `conversationId`.
    pub fn publish(&self, envelope: Envelope) -> Option<Delivery> {
        let topic = envelope.conversation_id()?.to_string();

        let mut state = self.state();
        let BrokerState {
            registry,
            directory,
            history,
        } = &mut *state;

        history.append(&topic, envelope.clone());
        let delivery = fanout::deliver(registry, directory, &topic, &envelope);
        debug!(
            "Published to {topic} from {}: {} delivered, {} evicted",
            envelope.sender_id().unwrap_or("unknown sender"),
            delivery.delivered,
            delivery.evicted.len()
        );
        Some(delivery)
    }

    /// Drop every subscription of `id` and forget the connection.
    ///
    /// Idempotent; returns `true` only for the call that actually removed it.
    pub fn disconnect(&self, id: &ConnectionId) -> bool {
        let mut state = self.state();
        let topics = state.directory.unsubscribe_all(id);
        let removed = state.registry.purge(id).is_some();
        if removed {
            info!(
                "Cleaned up {id}: left {topics} topics ({} live)",
                state.registry.len()
            );
        }
        removed
    }

    pub fn connection_count(&self) -> usize {
        self.state().registry.len()
    }

    pub fn is_connected(&self, id: &ConnectionId) -> bool {
        self.state().registry.contains(id)
    }

    pub fn label_of(&self, id: &ConnectionId) -> Option<String> {
        self.state().registry.label_of(id).map(str::to_string)
    }

    /// Number of distinct topics seen through subscribe or publish.
    pub fn topic_count(&self) -> usize {
        let state = self.state();
        // topics that only ever saw publishes exist in history alone
        let publish_only = state
            .history
            .topics()
            .filter(|topic| !state.directory.contains_topic(topic))
            .count();
        state.directory.topic_count() + publish_only
    }

    pub fn subscribers_of(&self, topic: &str) -> Vec<ConnectionId> {
        self.state().directory.subscribers_of(topic)
    }

    pub fn history_of(&self, topic: &str) -> Vec<Envelope> {
        self.state().history.history_of(topic)
    }
}
