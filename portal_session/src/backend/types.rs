use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::principal::Role;

use super::errors::BackendError;

#[derive(Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Sign-up form. Role-specific fields (specialty, date of birth, hospital)
/// travel in `profile`.
#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(flatten)]
    pub profile: Map<String, Value>,
}

impl Registration {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            password: password.into(),
            phone: None,
            profile: Map::new(),
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.profile.insert(key.into(), value.into());
        self
    }
}

impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("phone", &self.phone)
            .field("profile", &self.profile)
            .finish()
    }
}

/// Token and raw principal as the backend returned them. Either may be
/// missing; the auth layer decides which ones an operation requires.
#[derive(Clone, Default, PartialEq)]
pub struct BackendSession {
    pub access_token: Option<String>,
    pub principal: Option<Value>,
}

impl BackendSession {
    pub fn new(access_token: impl Into<String>, principal: Value) -> Self {
        Self {
            access_token: Some(access_token.into()),
            principal: Some(principal),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.access_token.is_none() && self.principal.is_none()
    }
}

impl std::fmt::Debug for BackendSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendSession")
            .field(
                "access_token",
                &self.access_token.as_ref().map(|_| "<redacted>"),
            )
            .field("principal", &self.principal)
            .finish()
    }
}

/// Operations the portal backend offers for each role.
#[async_trait]
pub trait AuthBackend: Send + Sync + 'static {
    async fn login(
        &self,
        role: Role,
        credentials: &Credentials,
    ) -> Result<BackendSession, BackendError>;

    /// `None` when the backend accepted the registration without opening a session.
    async fn register(
        &self,
        role: Role,
        registration: &Registration,
    ) -> Result<Option<BackendSession>, BackendError>;

    /// Revoke `access_token` on the server.
    async fn logout(&self, role: Role, access_token: &str) -> Result<(), BackendError>;

    /// Raw principal of the user owning `access_token`.
    async fn get_profile(&self, role: Role, access_token: &str) -> Result<Value, BackendError>;

    async fn refresh(&self, role: Role, access_token: &str)
    -> Result<BackendSession, BackendError>;

    async fn oauth_authorize_url(&self, role: Role) -> Result<String, BackendError>;

    /// Raw principal for a token handed over by the OAuth redirect.
    async fn oauth_complete(&self, access_token: &str) -> Result<Value, BackendError>;
}
