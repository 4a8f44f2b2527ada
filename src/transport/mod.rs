//! The `transport` module handles network communication with clients over
//! WebSockets.
//!
//! It defines the JSON records exchanged with clients, the per-connection
//! session protocol handler, and the WebSocket server driving sessions.

pub mod message;
pub mod session;
pub mod websocket;

pub use message::{ClientMessage, ServerMessage};
pub use websocket::{serve, start_websocket_server};

#[cfg(test)]
mod tests;
