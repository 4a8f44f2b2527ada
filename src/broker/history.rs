//! History store
//!
//! Append-only, per-topic sequences of envelopes in server arrival order.
//! Growth is unbounded unless a per-topic cap is configured, in which case the
//! oldest envelopes are dropped first.

use std::collections::{HashMap, VecDeque};

use crate::broker::envelope::Envelope;

#[derive(Debug, Default)]
pub struct HistoryStore {
    topics: HashMap<String, VecDeque<Envelope>>,
    max_per_topic: Option<usize>,
}

impl HistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A cap of zero is treated as no cap.
    pub fn with_limit(max_per_topic: Option<usize>) -> Self {
        Self {
            topics: HashMap::new(),
            max_per_topic: max_per_topic.filter(|&max| max > 0),
        }
    }

    pub fn append(&mut self, topic: &str, envelope: Envelope) {
        let entries = self.topics.entry(topic.to_string()).or_default();
        entries.push_back(envelope);

        if let Some(max) = self.max_per_topic {
            while entries.len() > max {
                entries.pop_front();
            }
        }
    }

    /// Copy of the topic's history, oldest first; empty for unknown topics.
    pub fn history_of(&self, topic: &str) -> Vec<Envelope> {
        self.topics
            .get(topic)
            .map(|entries| entries.iter().cloned().collect())
            .unwrap_or_default()
    }

    #[cfg(test)]
    pub(crate) fn len_of(&self, topic: &str) -> usize {
        self.topics.get(topic).map_or(0, VecDeque::len)
    }

    pub fn topics(&self) -> impl Iterator<Item = &str> {
        self.topics.keys().map(String::as_str)
    }
}
