#![forbid(unsafe_code)]

//! Durable per-device key/value storage.
//!
//! Widgets persist small string flags (for example a dismissed affordance)
//! through the [`StorageBackend`] trait. The kernel never depends on a
//! particular store: tests use [`MemoryStorage`], native hosts can use
//! [`FileStorage`], and browser hosts wrap their own local storage.
//!
//! # Invariants
//!
//! 1. `get` after a successful `set` on the same backend returns the value.
//! 2. `remove` of a missing key is not an error.
//! 3. Backends never panic; every failure is a [`StorageError`].
//!
//! # File Format
//!
//! [`FileStorage`] keeps one JSON object of string values:
//!
//! ```json
//! { "hideAppointmentCTA": "true" }
//! ```
//!
//! Writes use a temp-file-then-rename pattern so a crash never leaves a
//! half-written file. A missing file reads as an empty store.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fmt;
use std::io;

#[cfg(feature = "file-storage")]
use std::path::{Path, PathBuf};

/// Errors from storage backends.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Underlying I/O failed.
    #[error("storage I/O failed: {0}")]
    Io(#[from] io::Error),

    /// Stored data could not be encoded or decoded.
    #[error("storage data is corrupted: {0}")]
    Serialization(String),

    /// The store is not reachable (quota, privacy mode, detached backend).
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Result alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// A string key/value store.
///
/// Methods take `&self`; backends use interior mutability so a single
/// store can be shared by several widgets.
pub trait StorageBackend {
    /// Read `key`. A missing key is `Ok(None)`.
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Write `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Delete `key`.
    fn remove(&self, key: &str) -> StorageResult<()>;

    /// Human-readable backend name, for logs.
    fn name(&self) -> &str;
}

// ---------------------------------------------------------------------------
// MemoryStorage
// ---------------------------------------------------------------------------

/// In-memory backend with failure injection.
#[derive(Default)]
pub struct MemoryStorage {
    entries: RefCell<BTreeMap<String, String>>,
    fail_reads: Cell<bool>,
    fail_writes: Cell<bool>,
}

impl fmt::Debug for MemoryStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryStorage")
            .field("entries", &self.entries.borrow().len())
            .field("fail_reads", &self.fail_reads.get())
            .field("fail_writes", &self.fail_writes.get())
            .finish()
    }
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `get` fail until turned off again.
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.set(fail);
    }

    /// Make every subsequent `set`/`remove` fail until turned off again.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }

    /// Drop every entry (an external storage reset).
    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl StorageBackend for MemoryStorage {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        if self.fail_reads.get() {
            return Err(StorageError::Unavailable("injected read failure".into()));
        }
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        if self.fail_writes.get() {
            return Err(StorageError::Unavailable("injected write failure".into()));
        }
        self.entries
            .borrow_mut()
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        if self.fail_writes.get() {
            return Err(StorageError::Unavailable("injected write failure".into()));
        }
        self.entries.borrow_mut().remove(key);
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}

// ---------------------------------------------------------------------------
// FileStorage
// ---------------------------------------------------------------------------

/// JSON-file backend.
///
/// The whole map is loaded lazily on first access and rewritten atomically
/// on every change. The parent directory must already exist.
#[cfg(feature = "file-storage")]
pub struct FileStorage {
    path: PathBuf,
    cache: RefCell<Option<BTreeMap<String, String>>>,
}

#[cfg(feature = "file-storage")]
impl fmt::Debug for FileStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileStorage")
            .field("path", &self.path)
            .field("loaded", &self.cache.borrow().is_some())
            .finish()
    }
}

#[cfg(feature = "file-storage")]
impl FileStorage {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cache: RefCell::new(None),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> StorageResult<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let contents = std::fs::read_to_string(&self.path)?;
        if contents.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&contents).map_err(|e| {
            StorageError::Serialization(format!(
                "failed to parse {}: {e}",
                self.path.display()
            ))
        })
    }

    fn save(&self, entries: &BTreeMap<String, String>) -> StorageResult<()> {
        let json = serde_json::to_string_pretty(entries)
            .map_err(|e| StorageError::Serialization(format!("failed to encode store: {e}")))?;
        let temp = self.path.with_extension("json.tmp");
        std::fs::write(&temp, json)?;
        std::fs::rename(&temp, &self.path)?;
        tracing::trace!(
            target: "sfui.storage",
            path = %self.path.display(),
            entries = entries.len(),
            "store flushed"
        );
        Ok(())
    }

    /// Run `f` on the cached map, loading it first if needed.
    fn with_entries<R>(
        &self,
        f: impl FnOnce(&mut BTreeMap<String, String>) -> R,
    ) -> StorageResult<R> {
        let mut cache = self.cache.borrow_mut();
        if cache.is_none() {
            *cache = Some(self.load()?);
        }
        match cache.as_mut() {
            Some(entries) => Ok(f(entries)),
            None => Err(StorageError::Unavailable("store cache not loaded".into())),
        }
    }

    /// Apply a mutation and flush. The cache is dropped if the flush fails
    /// so the next access re-reads the file.
    fn mutate(&self, f: impl FnOnce(&mut BTreeMap<String, String>)) -> StorageResult<()> {
        let snapshot = self.with_entries(|entries| {
            f(entries);
            entries.clone()
        })?;
        if let Err(err) = self.save(&snapshot) {
            *self.cache.borrow_mut() = None;
            return Err(err);
        }
        Ok(())
    }
}

#[cfg(feature = "file-storage")]
impl StorageBackend for FileStorage {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        self.with_entries(|entries| entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        self.mutate(|entries| {
            entries.insert(key.to_owned(), value.to_owned());
        })
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        self.mutate(|entries| {
            entries.remove(key);
        })
    }

    fn name(&self) -> &str {
        "file"
    }
}
