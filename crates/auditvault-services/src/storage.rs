//! Key-value storage for client state
//!
//! Two scopes are used: a persistent *local* store (auth session, upload
//! history) and a *session* store (cached signed payload) that is discarded on
//! explicit reset. Both share the [`KeyValueStore`] interface; values are JSON
//! strings so the stored shapes stay readable on disk.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use auditvault_core::AppError;
use serde::de::DeserializeOwned;
use serde::Serialize;

pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, AppError>;
    fn set(&self, key: &str, value: String) -> Result<(), AppError>;
    fn remove(&self, key: &str) -> Result<(), AppError>;
    /// Drop every key in this scope.
    fn clear(&self) -> Result<(), AppError>;
}

/// Typed JSON helpers on top of any [`KeyValueStore`].
pub trait KeyValueStoreExt: KeyValueStore {
    fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, AppError> {
        match self.get(key)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    fn set_json<T: Serialize>(&self, key: &str, value: &T) -> Result<(), AppError> {
        self.set(key, serde_json::to_string(value)?)
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStoreExt for S {}

/// Process-local store, used for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, BTreeMap<String, String>>, AppError> {
        self.entries
            .lock()
            .map_err(|_| AppError::Storage("store lock poisoned".to_string()))
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: String) -> Result<(), AppError> {
        self.lock()?.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), AppError> {
        self.lock()?.remove(key);
        Ok(())
    }

    fn clear(&self) -> Result<(), AppError> {
        self.lock()?.clear();
        Ok(())
    }
}

/// Store persisted as one JSON object per file. Every write rewrites the file
/// through a temporary sibling and a rename.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    guard: Mutex<()>,
}

impl JsonFileStore {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, AppError> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        Ok(Self {
            path,
            guard: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, AppError> {
        match fs::read_to_string(&self.path) {
            Ok(raw) if raw.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(map) => Ok(map),
                Err(e) => {
                    tracing::warn!(path = %self.path.display(), error = %e, "Discarding unreadable store file");
                    Ok(BTreeMap::new())
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn write_all(&self, entries: &BTreeMap<String, String>) -> Result<(), AppError> {
        let tmp = self.path.with_extension("json.tmp");
        {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(serde_json::to_string_pretty(entries)?.as_bytes())?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn update<F>(&self, f: F) -> Result<(), AppError>
    where
        F: FnOnce(&mut BTreeMap<String, String>),
    {
        let _guard = self
            .guard
            .lock()
            .map_err(|_| AppError::Storage("store lock poisoned".to_string()))?;
        let mut entries = self.read_all()?;
        f(&mut entries);
        self.write_all(&entries)
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        let _guard = self
            .guard
            .lock()
            .map_err(|_| AppError::Storage("store lock poisoned".to_string()))?;
        Ok(self.read_all()?.remove(key))
    }

    fn set(&self, key: &str, value: String) -> Result<(), AppError> {
        self.update(|entries| {
            entries.insert(key.to_string(), value);
        })
    }

    fn remove(&self, key: &str) -> Result<(), AppError> {
        self.update(|entries| {
            entries.remove(key);
        })
    }

    fn clear(&self) -> Result<(), AppError> {
        self.update(|entries| entries.clear())
    }
}
