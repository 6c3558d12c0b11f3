//! Key-value storage backends
//!
//! [`Storage`] mirrors the browser `Storage` interface: string keys, string values,
//! and every operation may fail. The [`CredentialStore`](crate::CredentialStore) is the
//! only consumer and turns those failures into "absent".

use crate::error::{StorageError, StorageResult};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// String-keyed durable slots
pub trait Storage: Send + Sync {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>>;
    fn set_item(&self, key: &str, value: &str) -> StorageResult<()>;
    fn remove_item(&self, key: &str) -> StorageResult<()>;
}

/// Process-local storage; contents are lost when the process exits
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        let items = self
            .items
            .lock()
            .map_err(|_| StorageError::unavailable("memory storage lock poisoned"))?;
        Ok(items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut items = self
            .items
            .lock()
            .map_err(|_| StorageError::unavailable("memory storage lock poisoned"))?;
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> StorageResult<()> {
        let mut items = self
            .items
            .lock()
            .map_err(|_| StorageError::unavailable("memory storage lock poisoned"))?;
        items.remove(key);
        Ok(())
    }
}

/// Storage persisted as a JSON object of string slots in a single file.
///
/// A missing file reads as empty storage. Parent directories are created on the first
/// write.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process
    lock: Mutex<()>,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> StorageResult<BTreeMap<String, String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) if content.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, items: &BTreeMap<String, String>) -> StorageResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let content = serde_json::to_string_pretty(items)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }

    fn modify<F>(&self, f: F) -> StorageResult<()>
    where
        F: FnOnce(&mut BTreeMap<String, String>) -> bool,
    {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| StorageError::unavailable("file storage lock poisoned"))?;
        let mut items = self.load()?;
        if f(&mut items) {
            self.save(&items)?;
        }
        Ok(())
    }
}

impl Storage for FileStorage {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| StorageError::unavailable("file storage lock poisoned"))?;
        Ok(self.load()?.remove(key))
    }

    fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        self.modify(|items| {
            items.insert(key.to_string(), value.to_string());
            true
        })
    }

    fn remove_item(&self, key: &str) -> StorageResult<()> {
        // Removing an absent key leaves the file untouched
        self.modify(|items| items.remove(key).is_some())
    }
}
