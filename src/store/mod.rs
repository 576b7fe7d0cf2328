//! All things related to the storage of note blobs
//!
//! The store is a plain key-value capability: a conditional create, a read, a delete and an
//! existence check. It has no notion of expiry or of notes at all, that is left to the
//! [`NoteLifecycle`](crate::lifecycle::NoteLifecycle).

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

pub use memory::Memory;
pub use postgres::Postgres;
pub use timeout::Timeout;

mod memory;
mod postgres;
mod timeout;

/// Storage errors
#[derive(Debug, Error)]
pub enum Error {
    /// Nothing is stored at the requested key
    #[error("Object not found")]
    NotFound,

    /// A conditional create found an existing object at the key
    #[error("Object already exists")]
    Conflict,

    /// The store did not answer before the deadline
    #[error("Store call timed out after {0:?}")]
    Timeout(Duration),

    /// A connection error with the storage
    #[error("Connection error: {0}")]
    Connection(String),
}

/// Result type for all storage interactions
pub type Result<T> = core::result::Result<T, Error>;

/// Blob store with all supported operations
#[async_trait]
pub trait BlobStore: Send + Sync + 'static {
    /// Store `value` at `key`, but only when nothing is stored there yet
    ///
    /// Returns [`Error::Conflict`] when the key is taken
    async fn put_if_absent(&self, key: &str, value: Vec<u8>) -> Result<()>;

    /// Fetch the value stored at `key`
    ///
    /// Returns [`Error::NotFound`] when the key is absent
    async fn get(&self, key: &str) -> Result<Vec<u8>>;

    /// Remove the value stored at `key`
    ///
    /// Returns [`Error::NotFound`] when the key is absent
    async fn delete(&self, key: &str) -> Result<()>;

    /// Is anything stored at `key`?
    async fn exists(&self, key: &str) -> Result<bool>;
}

/// Shared handle to a blob store
pub type SharedStore = Arc<dyn BlobStore>;

/// Store configuration
pub enum Config {
    /// Detect configuration from environment
    ///
    /// Postgres when `DATABASE_URL` is set, memory otherwise
    DetectConfig,

    /// Use an existing store
    Existing(SharedStore),
}

/// Setup the storage, every call bounded by `timeout`
///
/// # Errors
///
/// Will return `Err` when the Postgres store can not connect or migrate
pub async fn setup(config: Config, timeout: Duration) -> anyhow::Result<SharedStore> {
    let store: SharedStore = match config {
        Config::DetectConfig => match std::env::var("DATABASE_URL") {
            Ok(url) if !url.is_empty() => {
                tracing::info!("Using Postgres note storage");

                Arc::new(Postgres::connect(&url).await?)
            }
            _ => {
                tracing::info!("`DATABASE_URL` is not set, notes are kept in memory");

                Arc::new(Memory::new())
            }
        },
        Config::Existing(store) => store,
    };

    Ok(Arc::new(Timeout::new(store, timeout)))
}
