//! File-backed key-value storage.
//!
//! One JSON object per file, mapping each key to its string value. Every
//! write rewrites the whole file through a sibling `.tmp` file and a rename.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tasklist_core::storage::{KeyValueStore, StorageError, StorageKey};

type Entries = BTreeMap<String, String>;

/// [`KeyValueStore`] persisted to a JSON file
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStorage {
    /// Storage backed by the file at `path`; nothing is touched until first use
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Backing file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<Entries, StorageError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(Entries::new()),
            Err(error) => return Err(error.into()),
        };
        serde_json::from_str(&raw).map_err(|error| {
            StorageError::Corrupted(format!("{}: {error}", self.path.display()))
        })
    }

    fn update(&self, change: impl FnOnce(&mut Entries)) -> Result<(), StorageError> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| StorageError::Unavailable("storage lock poisoned".to_string()))?;

        let mut entries = match self.read_entries() {
            Ok(entries) => entries,
            Err(StorageError::Corrupted(reason)) => {
                tracing::warn!(%reason, "Replacing corrupted storage file");
                Entries::new()
            },
            Err(error) => return Err(error),
        };
        change(&mut entries);

        let bytes = serde_json::to_vec_pretty(&entries)
            .map_err(|error| StorageError::Serialization(error.to_string()))?;
        write_atomic(&self.path, &bytes)?;
        tracing::debug!(path = %self.path.display(), bytes = bytes.len(), "Storage file written");
        Ok(())
    }
}

/// Sibling of `path` with `.tmp` appended to the full file name
fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".tmp");
    PathBuf::from(name)
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), StorageError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let tmp = temp_path(path);
    let written = fs::write(&tmp, bytes).and_then(|()| fs::rename(&tmp, path));
    if let Err(error) = written {
        if let Err(cleanup) = fs::remove_file(&tmp) {
            if cleanup.kind() != io::ErrorKind::NotFound {
                tracing::warn!(path = %tmp.display(), error = %cleanup, "Could not remove temporary file");
            }
        }
        return Err(error.into());
    }
    Ok(())
}

impl KeyValueStore for FileStorage {
    fn get(&self, key: &StorageKey) -> Result<Option<String>, StorageError> {
        Ok(self.read_entries()?.remove(key.as_str()))
    }

    fn set(&self, key: &StorageKey, value: &str) -> Result<(), StorageError> {
        self.update(|entries| {
            entries.insert(key.as_str().to_string(), value.to_string());
        })
    }
}
