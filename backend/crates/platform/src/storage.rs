//! Storage Infrastructure
//!
//! Key/value storage split into a session scope (lives as long as the
//! browsing session) and a persistent scope (survives restarts).
//!
//! Raw backends are fallible: embedded or sandboxed contexts may deny access
//! outright, and quotas may be exceeded. [`ResilientStorage`] converts every
//! such failure into `None` plus a log line, so callers only ever see
//! optional values.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use thiserror::Error;

/// Storage scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageScope {
    Session,
    Persistent,
}

impl StorageScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageScope::Session => "session",
            StorageScope::Persistent => "persistent",
        }
    }
}

impl fmt::Display for StorageScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised by raw storage backends
#[derive(Debug, Error)]
pub enum StorageError {
    /// Access blocked (disabled storage, sandboxed frame, policy)
    #[error("Storage access denied: {0}")]
    AccessDenied(String),

    /// Write would exceed the backend quota
    #[error("Storage quota exceeded ({used} of {limit} bytes)")]
    QuotaExceeded { used: usize, limit: usize },

    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage data corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Raw fallible storage primitive
pub trait StorageBackend: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    fn remove_item(&self, key: &str) -> Result<(), StorageError>;

    fn clear(&self) -> Result<(), StorageError>;
}

// ============================================================================
// Fail-soft facade
// ============================================================================

/// Fail-soft view over one storage scope
///
/// Never returns an error: denied or failing operations are logged
/// and reported as `None` / `false`. Failed operations are not retried.
#[derive(Clone)]
pub struct ResilientStorage {
    scope: StorageScope,
    backend: Arc<dyn StorageBackend>,
}

impl ResilientStorage {
    pub fn new(scope: StorageScope, backend: Arc<dyn StorageBackend>) -> Self {
        Self { scope, backend }
    }

    /// Read a value, `None` if missing or if storage is unavailable
    pub fn read(&self, key: &str) -> Option<String> {
        match self.backend.get_item(key) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(
                    scope = %self.scope,
                    key = %key,
                    error = %e,
                    "Storage read blocked"
                );
                None
            }
        }
    }

    /// Write a value, echoing it back on success
    pub fn write(&self, key: &str, value: &str) -> Option<String> {
        match self.backend.set_item(key, value) {
            Ok(()) => Some(value.to_string()),
            Err(e) => {
                tracing::warn!(
                    scope = %self.scope,
                    key = %key,
                    error = %e,
                    "Storage write blocked"
                );
                None
            }
        }
    }

    /// Remove a value, `true` on success
    pub fn remove(&self, key: &str) -> bool {
        match self.backend.remove_item(key) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(
                    scope = %self.scope,
                    key = %key,
                    error = %e,
                    "Storage remove blocked"
                );
                false
            }
        }
    }

    /// Drop every value in this scope, `true` on success
    pub fn clear(&self) -> bool {
        match self.backend.clear() {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(scope = %self.scope, error = %e, "Storage clear blocked");
                false
            }
        }
    }
}

impl fmt::Debug for ResilientStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResilientStorage")
            .field("scope", &self.scope)
            .finish_non_exhaustive()
    }
}

/// Both storage scopes behind one handle
#[derive(Debug, Clone)]
pub struct StorageFacade {
    session: ResilientStorage,
    persistent: ResilientStorage,
}

impl StorageFacade {
    pub fn new(session: Arc<dyn StorageBackend>, persistent: Arc<dyn StorageBackend>) -> Self {
        Self {
            session: ResilientStorage::new(StorageScope::Session, session),
            persistent: ResilientStorage::new(StorageScope::Persistent, persistent),
        }
    }

    /// Both scopes held in memory
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(MemoryStorage::new()),
            Arc::new(MemoryStorage::new()),
        )
    }

    /// Both scopes denied, as inside a sandboxed frame
    pub fn blocked() -> Self {
        let backend: Arc<dyn StorageBackend> = Arc::new(BlockedStorage::default());
        Self::new(backend.clone(), backend)
    }

    pub fn session(&self) -> &ResilientStorage {
        &self.session
    }

    pub fn persistent(&self) -> &ResilientStorage {
        &self.persistent
    }
}

// ============================================================================
// Backends
// ============================================================================

/// In-process storage, optionally capped at a byte quota
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: Mutex<HashMap<String, String>>,
    quota_bytes: Option<usize>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Limit the total size of keys plus values
    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            items: Mutex::new(HashMap::new()),
            quota_bytes: Some(quota_bytes),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, StorageError> {
        self.items
            .lock()
            .map_err(|_| StorageError::AccessDenied("storage lock poisoned".to_string()))
    }
}

impl StorageBackend for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut items = self.lock()?;
        if let Some(limit) = self.quota_bytes {
            let used: usize = items
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum::<usize>()
                + key.len()
                + value.len();
            if used > limit {
                return Err(StorageError::QuotaExceeded { used, limit });
            }
        }
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.lock()?.remove(key);
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        self.lock()?.clear();
        Ok(())
    }
}

/// Storage that denies every operation
#[derive(Debug, Clone)]
pub struct BlockedStorage {
    reason: String,
}

impl BlockedStorage {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    fn deny<T>(&self) -> Result<T, StorageError> {
        Err(StorageError::AccessDenied(self.reason.clone()))
    }
}

impl Default for BlockedStorage {
    fn default() -> Self {
        Self::new("storage is not available in this context")
    }
}

impl StorageBackend for BlockedStorage {
    fn get_item(&self, _key: &str) -> Result<Option<String>, StorageError> {
        self.deny()
    }

    fn set_item(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
        self.deny()
    }

    fn remove_item(&self, _key: &str) -> Result<(), StorageError> {
        self.deny()
    }

    fn clear(&self) -> Result<(), StorageError> {
        self.deny()
    }
}

/// JSON file backed storage for the persistent scope
///
/// The whole map is read and rewritten on each operation.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    fn load(&self) -> Result<BTreeMap<String, String>, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) if contents.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn store(&self, items: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(items)?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn modify(
        &self,
        f: impl FnOnce(&mut BTreeMap<String, String>),
    ) -> Result<(), StorageError> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| StorageError::AccessDenied("storage lock poisoned".to_string()))?;
        let mut items = self.load()?;
        f(&mut items);
        self.store(&items)
    }
}

impl StorageBackend for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.load()?.remove(key))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.modify(|items| {
            items.insert(key.to_string(), value.to_string());
        })
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.modify(|items| {
            items.remove(key);
        })
    }

    fn clear(&self) -> Result<(), StorageError> {
        self.modify(BTreeMap::clear)
    }
}
