//! Topic directory
//!
//! Maps each conversation id to the set of connections subscribed to it.
//! Topics are created on first use and never removed; an emptied topic keeps
//! its (empty) entry for the life of the process.
//!
//! Concurrency note: callers must synchronize access (the broker lock).
//! `subscribers_of` hands out copies so fan-out never iterates a live set.

use std::collections::{HashMap, HashSet};

use crate::client::ConnectionId;

#[derive(Debug, Default)]
pub struct TopicDirectory {
    topics: HashMap<String, HashSet<ConnectionId>>,
}

impl TopicDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a subscriber, creating the topic if needed. Duplicate adds are
    /// ignored; returns whether the subscription is new.
    pub fn subscribe(&mut self, topic: &str, id: ConnectionId) -> bool {
        self.topics.entry(topic.to_string()).or_default().insert(id)
    }

    /// Remove a subscriber from one topic; returns whether it was subscribed.
    pub fn unsubscribe(&mut self, topic: &str, id: &ConnectionId) -> bool {
        self.topics
            .get_mut(topic)
            .is_some_and(|subscribers| subscribers.remove(id))
    }

    /// Remove a subscriber from every topic, returning how many it left.
    pub fn unsubscribe_all(&mut self, id: &ConnectionId) -> usize {
        self.topics
            .values_mut()
            .map(|subscribers| subscribers.remove(id))
            .filter(|removed| *removed)
            .count()
    }

    /// Point-in-time copy of a topic's subscribers (empty for unknown topics).
    pub fn subscribers_of(&self, topic: &str) -> Vec<ConnectionId> {
        self.topics
            .get(topic)
            .map(|subscribers| subscribers.iter().copied().collect())
            .unwrap_or_default()
    }

    #[cfg(test)]
    pub(crate) fn is_subscribed(&self, topic: &str, id: &ConnectionId) -> bool {
        self.topics
            .get(topic)
            .is_some_and(|subscribers| subscribers.contains(id))
    }

    pub fn topic_count(&self) -> usize {
        self.topics.len()
    }

    pub fn contains_topic(&self, topic: &str) -> bool {
        self.topics.contains_key(topic)
    }
}
