use crate::principal::{Principal, Role};

/// Token and principal persisted for one role namespace.
#[derive(Clone, PartialEq)]
pub struct Session {
    pub access_token: String,
    pub principal: Principal,
    /// Namespace the session lives in
    pub role: Role,
}

impl Session {
    pub fn new(access_token: impl Into<String>, principal: Principal) -> Self {
        let role = principal.role.namespace();
        Self {
            access_token: access_token.into(),
            principal,
            role,
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("access_token", &"<redacted>")
            .field("principal", &self.principal)
            .field("role", &self.role)
            .finish()
    }
}
