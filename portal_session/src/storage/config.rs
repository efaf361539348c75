use std::sync::{Arc, LazyLock};

use super::errors::StorageError;
use super::types::{FileKeyValueStore, InMemoryKeyValueStore, KeyValueStore};

/// Either "memory" or "file"
pub static PORTAL_SESSION_STORE_TYPE: LazyLock<String> = LazyLock::new(|| {
    std::env::var("PORTAL_SESSION_STORE_TYPE").unwrap_or_else(|_| "memory".to_string())
});

pub static PORTAL_SESSION_STORE_PATH: LazyLock<String> = LazyLock::new(|| {
    std::env::var("PORTAL_SESSION_STORE_PATH")
        .unwrap_or_else(|_| "portal_session.json".to_string())
});

/// Build the key/value store selected by `PORTAL_SESSION_STORE_TYPE`.
pub fn key_value_store_from_env() -> Result<Arc<dyn KeyValueStore>, StorageError> {
    build_key_value_store(
        PORTAL_SESSION_STORE_TYPE.as_str(),
        PORTAL_SESSION_STORE_PATH.as_str(),
    )
}

pub(super) fn build_key_value_store(
    store_type: &str,
    store_path: &str,
) -> Result<Arc<dyn KeyValueStore>, StorageError> {
    tracing::info!(
        "Initializing session key/value store with type: {}, path: {}",
        store_type,
        store_path
    );

    let store: Arc<dyn KeyValueStore> = match store_type {
        "memory" => Arc::new(InMemoryKeyValueStore::new()),
        "file" => Arc::new(FileKeyValueStore::open(store_path)?),
        t => {
            return Err(StorageError::Config(format!(
                "Unsupported session store type: {t}. Supported types are 'memory' and 'file'"
            )));
        }
    };

    Ok(store)
}
