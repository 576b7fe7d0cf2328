//! Deadline for every store call
//!
//! A store that does not answer in time is an error, never an absent object

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;

use super::BlobStore;
use super::Error;
use super::Result;
use super::SharedStore;

/// Wraps a store, failing every call that takes longer than the deadline
pub struct Timeout {
    /// The wrapped store
    inner: SharedStore,

    /// Deadline per call
    deadline: Duration,
}

impl Timeout {
    /// Bound every call to `inner` by `deadline`
    pub fn new(inner: SharedStore, deadline: Duration) -> Self {
        Self { inner, deadline }
    }

    async fn bounded<T, F>(&self, call: F) -> Result<T>
    where
        F: Future<Output = Result<T>> + Send,
    {
        tokio::time::timeout(self.deadline, call)
            .await
            .unwrap_or(Err(Error::Timeout(self.deadline)))
    }
}

#[async_trait]
impl BlobStore for Timeout {
    async fn put_if_absent(&self, key: &str, value: Vec<u8>) -> Result<()> {
        self.bounded(self.inner.put_if_absent(key, value)).await
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>> {
        self.bounded(self.inner.get(key)).await
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.bounded(self.inner.delete(key)).await
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        self.bounded(self.inner.exists(key)).await
    }
}
