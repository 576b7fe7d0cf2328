//! Memory storage
//!
//! Will be destroyed on system shutdown

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::BlobStore;
use super::Error;
use super::Result;

/// An in-memory blob store
///
/// Will be destroyed on system shutdown
#[derive(Clone, Debug, Default)]
pub struct Memory {
    /// All blobs in storage, by key
    blobs: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl Memory {
    /// Create a new empty Memory storage
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BlobStore for Memory {
    async fn put_if_absent(&self, key: &str, value: Vec<u8>) -> Result<()> {
        match self.blobs.lock().await.entry(key.to_string()) {
            Entry::Occupied(_) => Err(Error::Conflict),
            Entry::Vacant(entry) => {
                entry.insert(value);

                Ok(())
            }
        }
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>> {
        self.blobs
            .lock()
            .await
            .get(key)
            .cloned()
            .ok_or(Error::NotFound)
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.blobs
            .lock()
            .await
            .remove(key)
            .map(|_| ())
            .ok_or(Error::NotFound)
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.blobs.lock().await.contains_key(key))
    }
}
