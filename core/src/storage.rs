//! Key-value storage abstraction.
//!
//! A [`KeyValueStore`] is the durable collaborator behind storage effects: a
//! flat map from [`StorageKey`] to a string value, where every write replaces
//! the whole value. It is deliberately as small as browser local storage.
//!
//! # Implementations
//!
//! - `FileStorage` (in the `todo` crate): one JSON file on disk
//! - `InMemoryStorage` (in `tasklist-testing`): `HashMap`-backed, with write
//!   failure injection for tests
//!
//! # Example
//!
//! ```
//! use tasklist_core::storage::{KeyValueStore, StorageError, StorageKey};
//!
//! fn roundtrip<S: KeyValueStore>(store: &S) -> Result<(), StorageError> {
//!     let key = StorageKey::new("todos");
//!     store.set(&key, "[]")?;
//!     assert_eq!(store.get(&key)?.as_deref(), Some("[]"));
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error type for `StorageKey` parsing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid storage key: {0}")]
pub struct ParseStorageKeyError(String);

/// Name under which a value is stored.
///
/// # Validation
///
/// - `FromStr::from_str()`: Validates input (rejects empty or blank strings)
/// - `new()` and `From`: No validation (for application-controlled keys)
///
/// # Examples
///
/// ```
/// use tasklist_core::storage::StorageKey;
///
/// let key: StorageKey = "todos".parse().unwrap();
/// assert_eq!(key, StorageKey::new("todos"));
/// assert!("  ".parse::<StorageKey>().is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StorageKey(String);

impl StorageKey {
    /// Create a new `StorageKey` without validation.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Get the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for StorageKey {
    type Err = ParseStorageKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ParseStorageKeyError("storage key cannot be empty".to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }
}

impl From<&str> for StorageKey {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for StorageKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Errors that can occur during storage operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// The backing medium could not be read or written.
    #[error("I/O error: {0}")]
    Io(String),

    /// The backing medium exists but its contents cannot be understood.
    #[error("Storage corrupted: {0}")]
    Corrupted(String),

    /// A value could not be encoded for storage.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The backend refused the operation (full, read-only, disabled).
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

impl From<std::io::Error> for StorageError {
    fn from(error: std::io::Error) -> Self {
        Self::Io(error.to_string())
    }
}

/// Synchronous key-value store.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` so a single handle can be shared
/// through `Arc<dyn KeyValueStore>` by the environment and the effects built
/// from it.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`.
    ///
    /// Returns `Ok(None)` when the key has never been written.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when the backend cannot be read.
    fn get(&self, key: &StorageKey) -> Result<Option<String>, StorageError>;

    /// Replace the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when the value could not be stored. The
    /// previous value is left in place in that case.
    fn set(&self, key: &StorageKey, value: &str) -> Result<(), StorageError>;
}
