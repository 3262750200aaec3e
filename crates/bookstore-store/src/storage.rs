//! # Storage Backend
//!
//! The local-storage analog: a string key/value medium holding the
//! per-user JSON slices.
//!
//! ## Key Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    Persisted Key Layout                         │
//! │                                                                 │
//! │  bookstore_cart_<userId>     → JSON array of CartItem           │
//! │  bookstore_wishlist_<userId> → JSON array of book ids           │
//! │  bookstore_orders_<userId>   → JSON array of Order              │
//! │                                                                 │
//! │  Namespacing by user id is the ONLY isolation mechanism:        │
//! │  no user must ever observe another user's slices.               │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Failure Policy
//! Writes surface `StorageError`. Reads of malformed JSON log a warning
//! and yield the empty slice ("no saved data"), so a corrupted key can
//! always be recovered by the next write.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{StorageError, StoreResult};

// =============================================================================
// Key Helpers
// =============================================================================

/// Storage key for a user's cart lines.
pub fn cart_key(user_id: &str) -> String {
    format!("bookstore_cart_{user_id}")
}

/// Storage key for a user's wishlist ids.
pub fn wishlist_key(user_id: &str) -> String {
    format!("bookstore_wishlist_{user_id}")
}

/// Storage key for a user's order history.
pub fn orders_key(user_id: &str) -> String {
    format!("bookstore_orders_{user_id}")
}

// =============================================================================
// Backend Trait
// =============================================================================

/// A string key/value persistence medium.
///
/// Implementations must be safe to share between threads; the stores hold
/// them behind `Arc<dyn StorageBackend>`.
pub trait StorageBackend: Send + Sync {
    /// Reads the raw value for a key, `None` when the key is absent.
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Writes the raw value for a key, creating or replacing it.
    fn write(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removes a key. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// Lists all present keys (used by back-office scans and tests).
    fn keys(&self) -> Result<Vec<String>, StorageError>;
}

// =============================================================================
// JSON Slice Helpers
// =============================================================================

/// Loads a JSON slice, treating absent or malformed data as the default.
pub fn load_slice<T>(backend: &dyn StorageBackend, key: &str) -> Result<T, StorageError>
where
    T: DeserializeOwned + Default,
{
    match backend.read(key)? {
        None => Ok(T::default()),
        Some(raw) => match serde_json::from_str(&raw) {
            Ok(value) => Ok(value),
            Err(e) => {
                warn!(key = %key, error = %e, "Malformed stored JSON, treating as no saved data");
                Ok(T::default())
            }
        },
    }
}

/// Serializes and writes a JSON slice.
pub fn save_slice<T>(backend: &dyn StorageBackend, key: &str, value: &T) -> StoreResult<()>
where
    T: Serialize,
{
    let raw = serde_json::to_string(value).map_err(|e| StorageError::serialize(key, e))?;
    backend.write(key, &raw)?;
    debug!(key = %key, bytes = raw.len(), "Slice persisted");
    Ok(())
}

// =============================================================================
// Memory Storage
// =============================================================================

/// In-memory backend for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        MemoryStorage::default()
    }
}

impl StorageBackend for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self
            .entries
            .lock()
            .map_err(|e| StorageError::io(key, format!("lock poisoned: {e}")))?;
        Ok(entries.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| StorageError::io(key, format!("lock poisoned: {e}")))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| StorageError::io(key, format!("lock poisoned: {e}")))?;
        entries.remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        let entries = self
            .entries
            .lock()
            .map_err(|e| StorageError::io("*", format!("lock poisoned: {e}")))?;
        Ok(entries.keys().cloned().collect())
    }
}

// =============================================================================
// File Storage
// =============================================================================

/// File-backed backend: one `<key>.json` file per key under a directory.
///
/// This is the desktop analog of browser local storage. Keys are already
/// filesystem-safe (`bookstore_<slice>_<uuid>`), so the mapping is direct.
#[derive(Debug)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Opens (and creates if needed) the storage directory.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self, StorageError> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)
            .map_err(|e| StorageError::io(dir.display().to_string(), e))?;
        Ok(FileStorage { dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl StorageBackend for FileStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key);
        match std::fs::read_to_string(&path) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::io(key, e)),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        std::fs::write(self.path_for(key), value).map_err(|e| StorageError::io(key, e))
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        match std::fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::io(key, e)),
        }
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        let mut keys = Vec::new();
        let entries = std::fs::read_dir(&self.dir)
            .map_err(|e| StorageError::io(self.dir.display().to_string(), e))?;

        for entry in entries {
            let entry = entry.map_err(|e| StorageError::io("*", e))?;
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if let Some(key) = name.strip_suffix(".json") {
                keys.push(key.to_string());
            }
        }

        Ok(keys)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
