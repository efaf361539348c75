//! Contract with the portal REST backend and its HTTP implementation.

mod client;
mod envelope;
mod errors;
mod types;

pub use client::HttpBackend;
pub use errors::BackendError;
pub use types::{AuthBackend, BackendSession, Credentials, Registration};
