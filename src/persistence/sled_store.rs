//! Blob store backed by `sled`
//!
//! Each upload is written once under a fresh UUID v4 name and served back
//! byte for byte. There is no overwrite, listing or deletion through the
//! public API.

use std::path::Path;

use sled::{Db, Tree};
use uuid::Uuid;

use crate::utils::StorageError;

const BLOB_TREE: &str = "blobs";

#[derive(Clone)]
pub struct BlobStore {
    db: Db,
    blobs: Tree,
}

impl BlobStore {
    /// Open or create a sled database at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        Self::from_db(sled::open(path)?)
    }

    /// A store that is deleted when the last handle drops.
    pub fn temporary() -> Result<Self, StorageError> {
        Self::from_db(sled::Config::new().temporary(true).open()?)
    }

    fn from_db(db: Db) -> Result<Self, StorageError> {
        let blobs = db.open_tree(BLOB_TREE)?;
        Ok(Self { db, blobs })
    }

    /// Persist `bytes` and return the generated name.
    pub fn put(&self, bytes: &[u8]) -> Result<String, StorageError> {
        if bytes.is_empty() {
            return Err(StorageError::Empty);
        }
        let name = Uuid::new_v4().to_string();
        self.blobs.insert(name.as_bytes(), bytes)?;
        Ok(name)
    }

    pub fn get(&self, name: &str) -> Result<Vec<u8>, StorageError> {
        self.blobs
            .get(name.as_bytes())?
            .map(|value| value.to_vec())
            .ok_or_else(|| StorageError::NotFound(name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }

    /// Force pending writes to disk.
    pub fn flush(&self) -> Result<(), StorageError> {
        self.db.flush()?;
        Ok(())
    }
}

impl std::fmt::Debug for BlobStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlobStore")
            .field("db", &"sled::Db")
            .field("blobs", &self.blobs.len())
            .finish()
    }
}
