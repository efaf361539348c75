use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use crate::storage::errors::StorageError;

use super::types::{FileKeyValueStore, KeyValueStore};

impl FileKeyValueStore {
    /// Open the store at `path`, reading any entries already persisted there.
    ///
    /// A missing file starts empty. An unreadable file is logged and replaced
    /// on the next write, so a damaged store never blocks sign-in.
    ///
    /// Several handles may share one path. Every operation re-reads the file
    /// and every write applies its change to what is on disk, so each handle
    /// sees the keys the others wrote.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let entry = read_entries(&path)?;

        tracing::info!(
            "Opened file key/value store at {:?} with {} entries",
            path,
            entry.len()
        );

        Ok(Self {
            path,
            entry: Mutex::new(entry),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Lock the store and bring the snapshot up to date with the file.
    fn refreshed(&self) -> Result<MutexGuard<'_, BTreeMap<String, String>>, StorageError> {
        let mut entry = self.entry.lock()?;
        *entry = read_entries(&self.path)?;
        Ok(entry)
    }

    fn persist(&self, entry: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let contents = serde_json::to_string_pretty(entry)?;
        let tmp_path = self
            .path
            .with_extension(format!("{}.tmp", std::process::id()));
        std::fs::write(&tmp_path, contents)?;
        std::fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}

fn read_entries(path: &Path) -> Result<BTreeMap<String, String>, StorageError> {
    match std::fs::read_to_string(path) {
        Ok(contents) if contents.trim().is_empty() => Ok(BTreeMap::new()),
        Ok(contents) => match serde_json::from_str(&contents) {
            Ok(entry) => Ok(entry),
            Err(e) => {
                tracing::warn!("Discarding unreadable store file {:?}: {}", path, e);
                Ok(BTreeMap::new())
            }
        },
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
        Err(e) => Err(e.into()),
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.refreshed()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entry = self.refreshed()?;
        entry.insert(key.to_string(), value.to_string());
        self.persist(&entry)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entry = self.refreshed()?;
        if entry.remove(key).is_some() {
            self.persist(&entry)?;
        }
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        Ok(self.refreshed()?.keys().cloned().collect())
    }
}
