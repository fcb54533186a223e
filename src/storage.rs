//! Persistent key-value storage mirroring browser `localStorage`.
//!
//! DESIGN
//! ======
//! `KeyValueStore` is the seam the auth bridge and the auth provider write
//! through. `MemoryStore` backs tests and ephemeral sessions; `FileStore`
//! keeps a flat JSON object on disk so the next process run ("page load")
//! sees what the previous one wrote.
//!
//! TRADE-OFFS
//! ==========
//! `FileStore` rewrites the whole file on every mutation. Entries are tiny
//! and writes are rare (sign-in, sign-out), so there is no batching.

#[cfg(test)]
#[path = "storage_test.rs"]
mod tests;

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Mutex;

/// Key holding the most recent bearer token.
pub const ID_TOKEN_KEY: &str = "idToken";
/// Key holding the signed-in user's identifier.
pub const UID_KEY: &str = "uid";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage io failed at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("storage file {} is not a JSON object: {source}", path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// String key-value store with whole-value overwrite semantics.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored at `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing medium cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` at `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing medium cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove `key`. Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing medium cannot be written.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

// =============================================================================
// MEMORY
// =============================================================================

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self
            .entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        entries.remove(key);
        Ok(())
    }
}

// =============================================================================
// FILE
// =============================================================================

/// JSON-file backed store. The file holds a single flat object of strings.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileStore {
    /// Open (or lazily create) the store at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing file cannot be read or parsed.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(raw) if raw.trim().is_empty() => BTreeMap::new(),
            Ok(raw) => serde_json::from_str(&raw).map_err(|source| StorageError::Corrupt { path: path.clone(), source })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(source) => return Err(StorageError::Io { path, source }),
        };
        Ok(Self { path, entries: Mutex::new(entries) })
    }

    fn flush(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|source| StorageError::Io { path: parent.to_path_buf(), source })?;
            }
        }
        let raw = serde_json::to_string_pretty(entries)
            .map_err(|source| StorageError::Corrupt { path: self.path.clone(), source })?;
        std::fs::write(&self.path, raw).map_err(|source| StorageError::Io { path: self.path.clone(), source })
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self
            .entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        entries.insert(key.to_owned(), value.to_owned());
        self.flush(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if entries.remove(key).is_none() {
            return Ok(());
        }
        self.flush(&entries)
    }
}
