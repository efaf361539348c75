//! portal-session - Client-side session and authentication layer for a
//! multi-role healthcare portal
//!
//! Doctors, patients, coordinators and administrators each get an isolated
//! session namespace in a shared key/value store. The crate restores those
//! sessions, runs login, registration and the OAuth callback handshake
//! against the portal backend, and decides where each principal lands.

mod auth;
mod backend;
mod config;
mod guard;
mod navigation;
mod oauth;
mod principal;
mod session;
mod storage;

#[cfg(test)]
mod test_utils;

pub use auth::{AuthError, AuthState, PortalAuth, RegistrationOutcome, RoleAuthService};

pub use backend::{
    AuthBackend, BackendError, BackendSession, Credentials, HttpBackend, Registration,
};

// Re-export the tunables
pub use config::{
    OAUTH_ERROR_REDIRECT_DELAY, OAUTH_SUCCESS_REDIRECT_DELAY, PORTAL_API_BASE_URL,
    PORTAL_HTTP_TIMEOUT, PORTAL_OAUTH_REDIRECT_URI, TOKEN_EXPIRY_LEEWAY_SECS,
};

pub use guard::{GuardDecision, RouteGuard};

pub use navigation::{
    ADMIN_DASHBOARD, ADMIN_LOGIN, COORDINATOR_DASHBOARD, COORDINATOR_LOGIN, DOCTOR_DASHBOARD,
    DOCTOR_LOGIN, Navigator, PATIENT_DASHBOARD, PATIENT_LOGIN, RecordingNavigator, landing_route,
    login_route,
};

pub use oauth::{OAuthCallbackParams, OAuthCompletion, OAuthPhase};

pub use principal::{AccountStatus, NormalizeError, Principal, Role, normalize_principal};

pub use session::{
    ADMIN_KEYS, COORDINATOR_KEYS, DOCTOR_KEYS, KeyTable, PATIENT_KEYS, Session, SessionError,
    SessionStore, StorageKeys,
};

pub use storage::{
    FileKeyValueStore, InMemoryKeyValueStore, KeyValueStore, PORTAL_SESSION_STORE_PATH,
    PORTAL_SESSION_STORE_TYPE, StorageError, key_value_store_from_env,
};
