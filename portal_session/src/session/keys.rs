use std::collections::HashSet;

use crate::principal::Role;

use super::errors::SessionError;

/// The pair of keys one namespace owns in the shared key/value store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorageKeys {
    pub token: &'static str,
    pub principal: &'static str,
}

impl StorageKeys {
    pub const fn new(token: &'static str, principal: &'static str) -> Self {
        Self { token, principal }
    }
}

pub const DOCTOR_KEYS: StorageKeys = StorageKeys::new("doctor_token", "doctor_user");
pub const PATIENT_KEYS: StorageKeys = StorageKeys::new("patient_token", "patient_user");
pub const COORDINATOR_KEYS: StorageKeys =
    StorageKeys::new("coordinator_token", "coordinator_user");
pub const ADMIN_KEYS: StorageKeys = StorageKeys::new("admin_token", "admin_user");

/// Key pairs for all four namespaces. No key appears twice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyTable {
    doctor: StorageKeys,
    patient: StorageKeys,
    coordinator: StorageKeys,
    admin: StorageKeys,
}

impl KeyTable {
    pub fn new(
        doctor: StorageKeys,
        patient: StorageKeys,
        coordinator: StorageKeys,
        admin: StorageKeys,
    ) -> Result<Self, SessionError> {
        let mut seen = HashSet::new();
        for keys in [doctor, patient, coordinator, admin] {
            for key in [keys.token, keys.principal] {
                if !seen.insert(key) {
                    return Err(SessionError::SharedKey(key.to_string()));
                }
            }
        }

        Ok(Self {
            doctor,
            patient,
            coordinator,
            admin,
        })
    }

    /// Keys of the namespace `role` belongs to.
    pub fn keys(&self, role: Role) -> StorageKeys {
        match role.namespace() {
            Role::Doctor => self.doctor,
            Role::Patient => self.patient,
            Role::Coordinator => self.coordinator,
            Role::Admin | Role::SuperAdmin => self.admin,
        }
    }

    /// Namespace owning `key`, if any.
    pub fn owner(&self, key: &str) -> Option<Role> {
        Role::NAMESPACES.into_iter().find(|role| {
            let keys = self.keys(*role);
            keys.token == key || keys.principal == key
        })
    }
}

impl Default for KeyTable {
    fn default() -> Self {
        Self {
            doctor: DOCTOR_KEYS,
            patient: PATIENT_KEYS,
            coordinator: COORDINATOR_KEYS,
            admin: ADMIN_KEYS,
        }
    }
}
