//! The broker manages connections, conversation topics, envelope history and
//! fan-out.
//!
//! - `registry`: live connections and their labels
//! - `topic`: topic → subscriber set
//! - `history`: topic → envelopes in arrival order
//! - `fanout`: delivery of one envelope to a snapshot of subscribers
//! - `engine`: the `Broker` hub tying them together under one lock

pub mod engine;
pub mod envelope;
pub mod fanout;
pub mod history;
pub mod registry;
pub mod topic;

pub use engine::Broker;
pub use envelope::Envelope;
