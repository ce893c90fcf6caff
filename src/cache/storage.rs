//! Storage Module
//!
//! The synchronous key-value substrate the cache persists into, with an
//! in-memory and a file-backed implementation.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use crate::error::StorageError;

type Result<T> = std::result::Result<T, StorageError>;

/// Default capacity of a storage backend, matching a typical browser origin.
pub const DEFAULT_QUOTA_BYTES: usize = 5 * 1024 * 1024;

// == Storage Trait ==
/// A string-to-string store scoped to one application.
///
/// Implementations must be safe to share between tasks; each call is
/// atomic with respect to other calls on the same store.
pub trait Storage: Send + Sync {
    /// Returns the value stored under `key`, if any.
    fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set_item(&self, key: &str, value: &str) -> Result<()>;

    /// Removes `key`; absent keys are not an error.
    fn remove_item(&self, key: &str) -> Result<()>;

    /// Lists every key currently stored.
    fn keys(&self) -> Result<Vec<String>>;
}

// == Quota Accounting ==
fn used_bytes(items: &HashMap<String, String>) -> usize {
    items.iter().map(|(k, v)| k.len() + v.len()).sum()
}

/// Size of the map after writing `key = value`.
fn bytes_after_write(items: &HashMap<String, String>, key: &str, value: &str) -> usize {
    let existing = items.get(key).map(|v| key.len() + v.len()).unwrap_or(0);
    used_bytes(items) - existing + key.len() + value.len()
}

fn check_quota(
    items: &HashMap<String, String>,
    key: &str,
    value: &str,
    quota: Option<usize>,
) -> Result<()> {
    if let Some(limit) = quota {
        let needed = bytes_after_write(items, key, value);
        if needed > limit {
            return Err(StorageError::QuotaExceeded { needed, limit });
        }
    }
    Ok(())
}

fn lock<'a, T>(mutex: &'a Mutex<T>) -> Result<MutexGuard<'a, T>> {
    mutex
        .lock()
        .map_err(|_| StorageError::Unavailable("storage lock poisoned".to_string()))
}

// == Memory Storage ==
#[derive(Debug, Default)]
struct MemoryState {
    items: HashMap<String, String>,
    disabled: bool,
}

/// In-memory storage with an optional byte quota.
///
/// Can be switched off at runtime to model a disabled storage backend.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    state: Mutex<MemoryState>,
    quota: Option<usize>,
}

impl MemoryStorage {
    /// Creates an unbounded in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an in-memory store that rejects writes beyond `quota` bytes.
    pub fn with_quota(quota: usize) -> Self {
        Self {
            state: Mutex::new(MemoryState::default()),
            quota: Some(quota),
        }
    }

    /// Enables or disables the store. A disabled store fails every call.
    pub fn set_enabled(&self, enabled: bool) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.disabled = !enabled;
    }

    /// Bytes currently used by keys and values.
    pub fn used_bytes(&self) -> usize {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        used_bytes(&state.items)
    }

    fn enabled_state(&self) -> Result<MutexGuard<'_, MemoryState>> {
        let state = lock(&self.state)?;
        if state.disabled {
            return Err(StorageError::Unavailable("storage is disabled".to_string()));
        }
        Ok(state)
    }
}

impl Storage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        let state = self.enabled_state()?;
        Ok(state.items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let mut state = self.enabled_state()?;
        check_quota(&state.items, key, value, self.quota)?;
        state.items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        let mut state = self.enabled_state()?;
        state.items.remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        let state = self.enabled_state()?;
        Ok(state.items.keys().cloned().collect())
    }
}

// == File Storage ==
/// Storage persisted as a single JSON object file.
///
/// The file is read once at open and rewritten after every mutation, so the
/// contents survive process restarts.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    items: Mutex<HashMap<String, String>>,
    quota: Option<usize>,
}

impl FileStorage {
    /// Opens (or lazily creates) the storage file at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_quota(path, None)
    }

    pub fn open_with_quota(path: impl AsRef<Path>, quota: Option<usize>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let items = match fs::read_to_string(&path) {
            Ok(raw) if raw.trim().is_empty() => HashMap::new(),
            Ok(raw) => serde_json::from_str(&raw)?,
            Err(e) if e.kind() == ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(e.into()),
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        Ok(Self {
            path,
            items: Mutex::new(items),
            quota,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes to a sibling temp file and renames it over the target.
    fn flush(&self, items: &HashMap<String, String>) -> Result<()> {
        let raw = serde_json::to_string(items)?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, raw)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl Storage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        let items = lock(&self.items)?;
        Ok(items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let mut items = lock(&self.items)?;
        check_quota(&items, key, value, self.quota)?;

        let previous = items.insert(key.to_string(), value.to_string());
        if let Err(e) = self.flush(&items) {
            // Keep memory in step with what is on disk.
            match previous {
                Some(old) => items.insert(key.to_string(), old),
                None => items.remove(key),
            };
            return Err(e);
        }
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        let mut items = lock(&self.items)?;
        let Some(previous) = items.remove(key) else {
            return Ok(());
        };
        if let Err(e) = self.flush(&items) {
            items.insert(key.to_string(), previous);
            return Err(e);
        }
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        let items = lock(&self.items)?;
        Ok(items.keys().cloned().collect())
    }
}
