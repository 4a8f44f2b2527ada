//! The `persistence` module stores uploaded blobs.
//!
//! Envelopes may reference blobs by path, but the broker never looks inside
//! either. Blobs live in a `sled` tree keyed by a generated name.

pub mod sled_store;

pub use sled_store::BlobStore;
