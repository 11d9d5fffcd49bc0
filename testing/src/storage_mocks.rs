//! In-memory key-value storage for fast, deterministic tests.

#![allow(clippy::unwrap_used)] // Test infrastructure uses unwrap for simplicity
#![allow(clippy::missing_panics_doc)] // Panics only on a poisoned lock

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use tasklist_core::storage::{KeyValueStore, StorageError, StorageKey};

/// `HashMap`-backed [`KeyValueStore`].
///
/// Besides storing values it can be told to reject writes (to exercise
/// persistence-failure paths) and counts every write attempt so tests can
/// assert that an operation did or did not touch storage.
///
/// Clones share the same underlying map and counters.
///
/// # Example
///
/// ```
/// use tasklist_core::storage::{KeyValueStore, StorageKey};
/// use tasklist_testing::InMemoryStorage;
///
/// let storage = InMemoryStorage::new().with_value("todos", "[]");
/// assert_eq!(storage.get(&StorageKey::new("todos")).unwrap().as_deref(), Some("[]"));
/// assert_eq!(storage.write_count(), 0);
/// ```
#[derive(Clone, Debug, Default)]
pub struct InMemoryStorage {
    values: Arc<RwLock<HashMap<StorageKey, String>>>,
    reject_writes: Arc<AtomicBool>,
    writes: Arc<AtomicUsize>,
}

impl InMemoryStorage {
    /// Create a new empty storage
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a value without counting it as a write
    #[must_use]
    pub fn with_value(self, key: &str, value: &str) -> Self {
        self.values
            .write()
            .unwrap()
            .insert(StorageKey::new(key), value.to_string());
        self
    }

    /// Make every subsequent `set` fail (or succeed again)
    pub fn fail_writes(&self, fail: bool) {
        self.reject_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of `set` calls so far, failed ones included
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Raw value currently stored under `key`
    #[must_use]
    pub fn value(&self, key: &str) -> Option<String> {
        self.values.read().unwrap().get(&StorageKey::new(key)).cloned()
    }

    fn check_writable(&self) -> Result<(), StorageError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.reject_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("quota exceeded".to_string()));
        }
        Ok(())
    }
}

impl KeyValueStore for InMemoryStorage {
    fn get(&self, key: &StorageKey) -> Result<Option<String>, StorageError> {
        Ok(self.values.read().unwrap().get(key).cloned())
    }

    fn set(&self, key: &StorageKey, value: &str) -> Result<(), StorageError> {
        self.check_writable()?;
        self.values
            .write()
            .unwrap()
            .insert(key.clone(), value.to_string());
        Ok(())
    }
}
