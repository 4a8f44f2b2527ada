//! The `utils` module provides the pieces shared by every other module:
//! the crate's error types and tracing initialisation.

pub mod error;
pub mod logging;

pub use error::{RelayError, StorageError};
