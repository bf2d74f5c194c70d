//! Key-value persistence slots.
//!
//! The storefront keeps client-side state (the cart, the interface language)
//! in named string slots, the same model as browser `localStorage`. Values are
//! opaque strings; serialization belongs to the caller.
//!
//! # Backends
//!
//! - [`FileStore`] - One JSON object file in the user's data directory.
//!   Survives restarts, scoped to the local user profile.
//! - [`MemoryStore`] - In-process map for tests and throwaway sessions. Can be
//!   switched into a failing mode to simulate an unavailable or full store.
//!
//! Nothing here is transactional: a process exit between a mutation and its
//! `set_item` loses that change.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Well-known slot names.
pub mod keys {
    /// Serialized shopping cart.
    pub const CART: &str = "shopping-cart";

    /// Selected interface locale.
    pub const LOCALE: &str = "locale";
}

/// Errors raised by a storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing file failed.
    #[error("storage I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The backing file exists but is not a JSON object of strings.
    #[error("storage file {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The store refused the write (quota exceeded, disabled, ...).
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// String key-value storage.
///
/// Reads and writes are synchronous from the caller's point of view.
pub trait KeyValueStore {
    /// Read the value stored under `key`, or `None` if the slot is empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the write.
    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Empty the slot under `key`. Removing an empty slot is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the write.
    fn remove_item(&mut self, key: &str) -> Result<(), StorageError>;
}

// =============================================================================
// MemoryStore
// =============================================================================

/// In-memory key-value store.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    items: BTreeMap<String, String>,
    failing: bool,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store with one slot already filled.
    #[must_use]
    pub fn with_item(key: &str, value: &str) -> Self {
        let mut store = Self::new();
        store.items.insert(key.to_owned(), value.to_owned());
        store
    }

    /// Make every subsequent write fail (or succeed again with `false`).
    pub const fn set_failing(&mut self, failing: bool) {
        self.failing = failing;
    }

    /// Whether no slot is filled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn check_writable(&self) -> Result<(), StorageError> {
        if self.failing {
            return Err(StorageError::Unavailable("quota exceeded".to_string()));
        }
        Ok(())
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.check_writable()?;
        self.items.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<(), StorageError> {
        self.check_writable()?;
        self.items.remove(key);
        Ok(())
    }
}

// =============================================================================
// FileStore
// =============================================================================

/// File-backed key-value store.
///
/// All slots live in a single JSON object (`{"slot": "value", ...}`). Every
/// write rewrites the whole file; a missing file reads as an empty store.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Application directory name under the platform data directory.
    pub const APP_DIR: &'static str = "ecwid-shop";

    /// File name used inside [`Self::APP_DIR`].
    pub const FILE_NAME: &'static str = "storage.json";

    /// Open (lazily) a store at `path`. The file is created on first write.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Default location: `<data dir>/ecwid-shop/storage.json`.
    ///
    /// Falls back to the current directory when the platform has no data
    /// directory.
    #[must_use]
    pub fn default_path() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(Self::APP_DIR)
            .join(Self::FILE_NAME)
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, StorageError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(source) => {
                return Err(StorageError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        serde_json::from_str(&raw).map_err(|source| StorageError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    fn write_all(&self, items: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let io_err = |source| StorageError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }

        let body = serde_json::to_string_pretty(items)
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        std::fs::write(&self.path, body).map_err(io_err)
    }
}

impl KeyValueStore for FileStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.read_all()?.remove(key))
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        // A corrupt file is replaced rather than blocking every future write.
        let mut items = match self.read_all() {
            Ok(items) => items,
            Err(StorageError::Corrupt { .. }) => {
                tracing::warn!(path = %self.path.display(), "Replacing corrupt storage file");
                BTreeMap::new()
            }
            Err(e) => return Err(e),
        };
        items.insert(key.to_owned(), value.to_owned());
        self.write_all(&items)
    }

    fn remove_item(&mut self, key: &str) -> Result<(), StorageError> {
        let mut items = self.read_all()?;
        if items.remove(key).is_some() {
            self.write_all(&items)?;
        }
        Ok(())
    }
}
