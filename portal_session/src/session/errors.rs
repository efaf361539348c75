use thiserror::Error;

use crate::principal::Role;
use crate::storage::StorageError;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SessionError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// A session whose role does not belong to the namespace it is written to
    #[error("Session for role {actual} cannot be stored in the {expected} namespace")]
    RoleMismatch { expected: Role, actual: Role },

    /// Stored entries that do not form a valid session
    #[error("Corrupt session: {0}")]
    Corrupt(String),

    #[error("Storage key '{0}' is shared between namespaces")]
    SharedKey(String),

    #[error("Json conversion(Serde) error: {0}")]
    Serde(String),
}

impl From<serde_json::Error> for SessionError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serde(err.to_string())
    }
}
