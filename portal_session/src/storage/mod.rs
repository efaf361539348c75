mod config;
mod errors;
mod file;
mod memory;
mod types;

pub use config::{PORTAL_SESSION_STORE_PATH, PORTAL_SESSION_STORE_TYPE, key_value_store_from_env};
pub use errors::StorageError;
pub use types::{FileKeyValueStore, InMemoryKeyValueStore, KeyValueStore};
