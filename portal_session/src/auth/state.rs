use crate::principal::Principal;
use crate::session::Session;

/// Observable state of one role's auth service.
#[derive(Clone, PartialEq)]
pub struct AuthState {
    pub principal: Option<Principal>,
    pub token: Option<String>,
    pub is_authenticated: bool,
    /// True until bootstrap has run and while a login or registration is in flight
    pub is_loading: bool,
    pub error: Option<String>,
}

impl AuthState {
    /// State before bootstrap has looked at storage.
    pub fn initial() -> Self {
        Self {
            is_loading: true,
            ..Self::signed_out()
        }
    }

    pub fn signed_out() -> Self {
        Self {
            principal: None,
            token: None,
            is_authenticated: false,
            is_loading: false,
            error: None,
        }
    }

    pub fn authenticated(session: &Session) -> Self {
        Self {
            principal: Some(session.principal.clone()),
            token: Some(session.access_token.clone()),
            is_authenticated: true,
            is_loading: false,
            error: None,
        }
    }
}

impl Default for AuthState {
    fn default() -> Self {
        Self::initial()
    }
}

impl std::fmt::Debug for AuthState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthState")
            .field("principal", &self.principal)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("is_authenticated", &self.is_authenticated)
            .field("is_loading", &self.is_loading)
            .field("error", &self.error)
            .finish()
    }
}
