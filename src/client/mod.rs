//! The `client` module defines the representation of a connected client.
//!
//! It provides the `Connection` struct, which encapsulates the state of a
//! single WebSocket connection: its identity, the optional label set by an
//! `identify` action, and the bounded queue feeding its socket writer.

pub mod connection;
pub use connection::{Connection, ConnectionId, Outbound, SendFailure};
