use std::sync::Arc;

use crate::backend::{AuthBackend, HttpBackend};
use crate::navigation::Navigator;
use crate::principal::Role;
use crate::session::{Session, SessionStore};
use crate::storage::key_value_store_from_env;

use super::errors::AuthError;
use super::service::RoleAuthService;

/// The four role services of the portal, sharing one store, one backend and
/// one navigator.
pub struct PortalAuth {
    store: SessionStore,
    backend: Arc<dyn AuthBackend>,
    navigator: Arc<dyn Navigator>,
    doctor: Arc<RoleAuthService>,
    patient: Arc<RoleAuthService>,
    coordinator: Arc<RoleAuthService>,
    admin: Arc<RoleAuthService>,
}

impl PortalAuth {
    pub fn new(
        store: SessionStore,
        backend: Arc<dyn AuthBackend>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        let service = |role| {
            Arc::new(RoleAuthService::new(
                role,
                store.clone(),
                backend.clone(),
                navigator.clone(),
            ))
        };
        Self {
            doctor: service(Role::Doctor),
            patient: service(Role::Patient),
            coordinator: service(Role::Coordinator),
            admin: service(Role::Admin),
            store,
            backend,
            navigator,
        }
    }

    /// Build the store and the HTTP backend from the environment.
    pub fn from_env(navigator: Arc<dyn Navigator>) -> Result<Self, AuthError> {
        let kv = key_value_store_from_env().map_err(|e| AuthError::Storage(e.to_string()))?;
        let backend = HttpBackend::from_env()?;
        Ok(Self::new(SessionStore::new(kv), Arc::new(backend), navigator))
    }

    /// Service owning `role`'s namespace. Super admins share the admin one.
    pub fn service(&self, role: Role) -> &Arc<RoleAuthService> {
        match role.namespace() {
            Role::Doctor => &self.doctor,
            Role::Patient => &self.patient,
            Role::Coordinator => &self.coordinator,
            _ => &self.admin,
        }
    }

    /// Bootstrap every namespace, returning the sessions that were restored.
    pub fn bootstrap_all(&self) -> Vec<Session> {
        Role::NAMESPACES
            .iter()
            .filter_map(|role| self.service(*role).bootstrap())
            .collect()
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub fn backend(&self) -> &Arc<dyn AuthBackend> {
        &self.backend
    }

    pub fn navigator(&self) -> &Arc<dyn Navigator> {
        &self.navigator
    }
}
