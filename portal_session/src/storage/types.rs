use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::Mutex;

use crate::storage::errors::StorageError;

/// Process-wide key/value space shared by every portal, the equivalent of
/// browser local storage.
///
/// Operations are synchronous: restoring a session must never suspend.
pub trait KeyValueStore: Send + Sync + 'static {
    /// Read the value stored under `key`.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove `key`. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// List every key currently present.
    fn keys(&self) -> Result<Vec<String>, StorageError>;
}

pub struct InMemoryKeyValueStore {
    pub(super) entry: Mutex<HashMap<String, String>>,
}

/// Key/value store persisted as a single JSON object on disk.
pub struct FileKeyValueStore {
    pub(super) path: PathBuf,
    pub(super) entry: Mutex<BTreeMap<String, String>>,
}
