//! Scriptable blob store for tests
//!
//! Behaves like the memory store, unless told to misbehave

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use async_trait::async_trait;

use crate::store::BlobStore;
use crate::store::Error;
use crate::store::Result;

#[derive(Default)]
pub struct FakeStore {
    blobs: Mutex<HashMap<String, Vec<u8>>>,

    /// Number of upcoming `put_if_absent` calls that report a conflict
    conflicts: AtomicUsize,

    fail_exists: AtomicBool,
    fail_puts: AtomicBool,
    fail_deletes: AtomicBool,

    /// Deletes remove the object, but still answer "not found"
    delete_reports_not_found: AtomicBool,

    /// `get` and `exists` never answer
    stall_reads: AtomicBool,

    pub exists_calls: AtomicUsize,
    pub get_calls: AtomicUsize,
    pub put_calls: AtomicUsize,
    pub delete_calls: AtomicUsize,
}

impl FakeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_raw(&self, key: &str, value: &[u8]) {
        self.blobs
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_vec());
    }

    pub fn contains(&self, key: &str) -> bool {
        self.blobs.lock().unwrap().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.blobs.lock().unwrap().len()
    }

    pub fn conflict_next(&self, count: usize) {
        self.conflicts.store(count, Ordering::SeqCst);
    }

    pub fn fail_exists(&self) {
        self.fail_exists.store(true, Ordering::SeqCst);
    }

    pub fn fail_puts(&self) {
        self.fail_puts.store(true, Ordering::SeqCst);
    }

    pub fn fail_deletes(&self) {
        self.fail_deletes.store(true, Ordering::SeqCst);
    }

    pub fn delete_reports_not_found(&self) {
        self.delete_reports_not_found.store(true, Ordering::SeqCst);
    }

    pub fn stall_reads(&self) {
        self.stall_reads.store(true, Ordering::SeqCst);
    }

    pub fn calls(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }

    fn take_conflict(&self) -> bool {
        self.conflicts
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |count| {
                count.checked_sub(1)
            })
            .is_ok()
    }

    async fn maybe_stall(&self) {
        if self.stall_reads.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
    }
}

#[async_trait]
impl BlobStore for FakeStore {
    async fn put_if_absent(&self, key: &str, value: Vec<u8>) -> Result<()> {
        self.put_calls.fetch_add(1, Ordering::SeqCst);

        if self.fail_puts.load(Ordering::SeqCst) {
            return Err(Error::Connection("put refused".to_string()));
        }

        if self.take_conflict() {
            return Err(Error::Conflict);
        }

        let mut blobs = self.blobs.lock().unwrap();
        if blobs.contains_key(key) {
            return Err(Error::Conflict);
        }
        blobs.insert(key.to_string(), value);

        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        self.maybe_stall().await;

        self.blobs
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .ok_or(Error::NotFound)
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);

        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(Error::Connection("delete refused".to_string()));
        }

        let removed = self.blobs.lock().unwrap().remove(key);

        if removed.is_none() || self.delete_reports_not_found.load(Ordering::SeqCst) {
            Err(Error::NotFound)
        } else {
            Ok(())
        }
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        self.exists_calls.fetch_add(1, Ordering::SeqCst);
        self.maybe_stall().await;

        if self.fail_exists.load(Ordering::SeqCst) {
            return Err(Error::Connection("exists refused".to_string()));
        }

        Ok(self.blobs.lock().unwrap().contains_key(key))
    }
}
