mod errors;
mod portal;
mod service;
mod state;


pub use errors::AuthError;
pub use portal::PortalAuth;
pub use service::{RegistrationOutcome, RoleAuthService};
pub use state::AuthState;

pub(crate) use service::check_account_status;
