use std::collections::HashMap;
use std::sync::Mutex;

use crate::storage::errors::StorageError;

use super::types::{InMemoryKeyValueStore, KeyValueStore};

impl InMemoryKeyValueStore {
    pub fn new() -> Self {
        tracing::info!("Creating new in-memory key/value store");
        Self {
            entry: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryKeyValueStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValueStore for InMemoryKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entry.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entry
            .lock()?
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entry.lock()?.remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        let mut keys: Vec<String> = self.entry.lock()?.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }
}
