//! Canonical identity model shared by every portal, and the mapping from the
//! backend's mixed camelCase/snake_case payloads into it.

mod errors;
mod normalize;
mod types;

pub use errors::NormalizeError;
pub use normalize::normalize_principal;
pub use types::{AccountStatus, Principal, Role};
