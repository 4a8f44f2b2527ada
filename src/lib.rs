//! # Courier
//!
//! `courier` is an in-memory relay for end-to-end encrypted chat. Clients
//! connect over WebSockets, subscribe to conversations and publish opaque
//! envelopes, which the relay stores in arrival order and fans out to every
//! current subscriber. Payloads are never inspected or decrypted.
//!
//! ## Core Modules
//!
//! - `broker`: connections, topics, envelope history and fan-out.
//! - `client`: the per-connection entity and its outbound queue.
//! - `config`: loading and merging server configuration.
//! - `http`: root document, static files, blob endpoints and health.
//! - `persistence`: the sled-backed blob store.
//! - `transport`: wire records, session protocol handler and WebSocket server.
//! - `utils`: error types and logging.

pub mod broker;
pub mod client;
pub mod config;
pub mod http;
pub mod persistence;
pub mod transport;
pub mod utils;
