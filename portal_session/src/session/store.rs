use std::sync::Arc;

use serde_json::Value;

use crate::principal::{Principal, Role, normalize_principal};
use crate::storage::KeyValueStore;

use super::errors::SessionError;
use super::keys::{KeyTable, StorageKeys};
use super::types::Session;

/// Namespaced persistence of sessions on top of a shared key/value store.
///
/// Every namespace owns its own token and principal key; a read never looks
/// at another namespace's keys.
#[derive(Clone)]
pub struct SessionStore {
    kv: Arc<dyn KeyValueStore>,
    keys: KeyTable,
}

impl SessionStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self::with_keys(kv, KeyTable::default())
    }

    pub fn with_keys(kv: Arc<dyn KeyValueStore>, keys: KeyTable) -> Self {
        Self { kv, keys }
    }

    pub fn keys(&self, role: Role) -> StorageKeys {
        self.keys.keys(role)
    }

    pub fn key_table(&self) -> &KeyTable {
        &self.keys
    }

    /// The underlying key/value store.
    pub fn backing_store(&self) -> &Arc<dyn KeyValueStore> {
        &self.kv
    }

    /// Persist `session` under `role`'s namespace.
    pub fn save(&self, role: Role, session: &Session) -> Result<(), SessionError> {
        for actual in [session.role, session.principal.role] {
            if !actual.shares_namespace(role) {
                return Err(SessionError::RoleMismatch {
                    expected: role.namespace(),
                    actual,
                });
            }
        }

        let keys = self.keys(role);
        let principal_json = serde_json::to_string(&session.principal)?;
        self.kv.set(keys.principal, &principal_json)?;
        self.kv.set(keys.token, &session.access_token)?;

        tracing::debug!(
            "Saved {} session for principal {}",
            role.namespace(),
            session.principal.id
        );
        Ok(())
    }

    /// Read the session stored under `role`'s namespace.
    ///
    /// Entries that do not form a valid session for this namespace (a
    /// principal of another role, unreadable JSON, a token without a
    /// principal) are removed and reported as absent.
    pub fn load(&self, role: Role) -> Result<Option<Session>, SessionError> {
        match self.read(role) {
            Err(SessionError::Corrupt(reason)) => {
                tracing::debug!(
                    "Discarding corrupt {} session: {}",
                    role.namespace(),
                    reason
                );
                self.clear(role)?;
                Ok(None)
            }
            other => other,
        }
    }

    /// Remove both keys of `role`'s namespace.
    pub fn clear(&self, role: Role) -> Result<(), SessionError> {
        let keys = self.keys(role);
        self.kv.remove(keys.token)?;
        self.kv.remove(keys.principal)?;
        Ok(())
    }

    /// Overwrite the stored principal, leaving the token untouched.
    pub fn update_principal(&self, role: Role, principal: &Principal) -> Result<(), SessionError> {
        if !principal.role.shares_namespace(role) {
            return Err(SessionError::RoleMismatch {
                expected: role.namespace(),
                actual: principal.role,
            });
        }
        let keys = self.keys(role);
        self.kv
            .set(keys.principal, &serde_json::to_string(principal)?)?;
        Ok(())
    }

    /// Overwrite the stored token, leaving the principal untouched.
    pub fn update_token(&self, role: Role, token: &str) -> Result<(), SessionError> {
        self.kv.set(self.keys(role).token, token)?;
        Ok(())
    }

    pub fn token(&self, role: Role) -> Result<Option<String>, SessionError> {
        Ok(self.kv.get(self.keys(role).token)?)
    }

    /// Write a token that has no validated principal yet.
    ///
    /// Any principal already in the namespace is removed first so the token
    /// can never pair up with a principal it does not belong to.
    pub(crate) fn stage_token(&self, role: Role, token: &str) -> Result<(), SessionError> {
        let keys = self.keys(role);
        self.kv.remove(keys.principal)?;
        self.kv.set(keys.token, token)?;
        Ok(())
    }

    /// Clear `role`'s namespace only if it still holds `token`. Returns whether
    /// anything was removed.
    pub(crate) fn clear_if_token(&self, role: Role, token: &str) -> Result<bool, SessionError> {
        if self.token(role)?.as_deref() == Some(token) {
            self.clear(role)?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn read(&self, role: Role) -> Result<Option<Session>, SessionError> {
        let keys = self.keys(role);
        let token = self.kv.get(keys.token)?;
        let principal_json = self.kv.get(keys.principal)?;

        let (token, principal_json) = match (token, principal_json) {
            (None, None) => return Ok(None),
            (Some(token), Some(principal_json)) if !token.trim().is_empty() => {
                (token, principal_json)
            }
            (Some(_), Some(_)) => return Err(SessionError::Corrupt("empty token".to_string())),
            (Some(_), None) => {
                return Err(SessionError::Corrupt("token without principal".to_string()));
            }
            (None, Some(_)) => {
                return Err(SessionError::Corrupt("principal without token".to_string()));
            }
        };

        let value: Value = serde_json::from_str(&principal_json)
            .map_err(|e| SessionError::Corrupt(format!("unreadable principal: {e}")))?;
        let principal = normalize_principal(&value, None)
            .map_err(|e| SessionError::Corrupt(format!("invalid principal: {e}")))?;

        if !principal.role.shares_namespace(role) {
            return Err(SessionError::Corrupt(format!(
                "principal role {} found in the {} namespace",
                principal.role,
                role.namespace()
            )));
        }

        Ok(Some(Session::new(token, principal)))
    }
}
