//! Fan-out dispatcher
//!
//! Delivers one envelope to every current subscriber of a topic:
//! 1. snapshot the subscriber set,
//! 2. queue a `message` record for each subscriber,
//! 3. remember every subscriber whose queue rejected the frame,
//! 4. unsubscribe those subscribers from this topic only.
//!
//! Evicted connections stay registered and subscribed elsewhere; their own
//! disconnect performs the full cleanup. Failures are never reported to the
//! publisher.

use tracing::{debug, error, warn};

use crate::broker::envelope::Envelope;
use crate::broker::registry::ConnectionRegistry;
use crate::broker::topic::TopicDirectory;
use crate::client::{ConnectionId, SendFailure};
use crate::transport::message::ServerMessage;

/// Outcome of one `deliver` call.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Delivery {
    /// Subscribers whose queue accepted the frame.
    pub delivered: usize,
    /// Subscribers removed from the topic because delivery failed.
    pub evicted: Vec<ConnectionId>,
}

pub fn deliver(
    registry: &ConnectionRegistry,
    directory: &mut TopicDirectory,
    topic: &str,
    envelope: &Envelope,
) -> Delivery {
    let subscribers = directory.subscribers_of(topic);
    let mut delivery = Delivery::default();
    if subscribers.is_empty() {
        return delivery;
    }

    let record = ServerMessage::Message {
        envelope: envelope.clone(),
    };
    let frame = match record.to_frame() {
        Ok(frame) => frame,
        Err(e) => {
            error!("Failed to serialize envelope for {topic}: {e}");
            return delivery;
        }
    };

    for sub_id in subscribers {
        let result = match registry.get(&sub_id) {
            Some(connection) => connection.outbound.push(frame.clone()),
            None => Err(SendFailure::Closed),
        };

        match result {
            Ok(()) => delivery.delivered += 1,
            Err(e) => {
                warn!("Delivery to {sub_id} on {topic} failed: {e}");
                delivery.evicted.push(sub_id);
            }
        }
    }

    for sub_id in &delivery.evicted {
        directory.unsubscribe(topic, sub_id);
        debug!("Evicted {sub_id} from {topic}");
    }

    delivery
}
