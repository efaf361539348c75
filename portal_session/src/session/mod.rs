mod errors;
mod keys;
mod store;
mod token;
mod types;

pub use errors::SessionError;
pub use keys::{
    ADMIN_KEYS, COORDINATOR_KEYS, DOCTOR_KEYS, KeyTable, PATIENT_KEYS, StorageKeys,
};
pub use store::SessionStore;
pub use types::Session;

pub(crate) use token::is_expired;
