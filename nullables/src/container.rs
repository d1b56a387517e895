//! Nullable container: thread-safe in-memory blob storage for testing.

use blobstate_store::{BlobContainer, StoreError};
use std::collections::{BTreeMap, HashSet};
use std::sync::Mutex;

/// Container operations, used to inject failures and count calls.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Op {
    Exists,
    Read,
    Write,
    List,
}

/// An in-memory container for testing.
/// Thread-safe so a single instance can be shared between threads.
#[derive(Default)]
pub struct NullContainer {
    blobs: Mutex<BTreeMap<String, Vec<u8>>>,
    failing: Mutex<HashSet<Op>>,
    writes: Mutex<Vec<String>>,
    lists: Mutex<u64>,
}

impl NullContainer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a blob without recording a write (builder style).
    pub fn with_blob(self, key: &str, body: impl AsRef<[u8]>) -> Self {
        self.blobs
            .lock()
            .unwrap()
            .insert(key.to_string(), body.as_ref().to_vec());
        self
    }

    /// Make every subsequent `op` fail with a backend error.
    pub fn fail_on(&self, op: Op) {
        self.failing.lock().unwrap().insert(op);
    }

    /// Keys written through [`BlobContainer::write_all`], in call order.
    pub fn writes(&self) -> Vec<String> {
        self.writes.lock().unwrap().clone()
    }

    /// How many times the container was listed (including emptiness checks).
    pub fn list_calls(&self) -> u64 {
        *self.lists.lock().unwrap()
    }

    /// Snapshot of all stored keys.
    pub fn keys(&self) -> Vec<String> {
        self.blobs.lock().unwrap().keys().cloned().collect()
    }

    fn check(&self, op: Op) -> Result<(), StoreError> {
        if self.failing.lock().unwrap().contains(&op) {
            return Err(StoreError::Backend(format!("injected {op:?} failure")));
        }
        Ok(())
    }
}

impl BlobContainer for NullContainer {
    fn exists(&self, key: &str) -> Result<bool, StoreError> {
        self.check(Op::Exists)?;
        Ok(self.blobs.lock().unwrap().contains_key(key))
    }

    fn read_all(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        self.check(Op::Read)?;
        self.blobs
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(key.to_string()))
    }

    fn write_all(&self, key: &str, bytes: &[u8]) -> Result<(), StoreError> {
        self.check(Op::Write)?;
        self.writes.lock().unwrap().push(key.to_string());
        self.blobs
            .lock()
            .unwrap()
            .insert(key.to_string(), bytes.to_vec());
        Ok(())
    }

    fn list(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        self.check(Op::List)?;
        *self.lists.lock().unwrap() += 1;
        Ok(self
            .blobs
            .lock()
            .unwrap()
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect())
    }
}
