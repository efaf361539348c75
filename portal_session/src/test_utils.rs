//! Test doubles shared by the unit tests of this crate

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{Value, json};
use tokio::sync::Notify;

use crate::auth::PortalAuth;
use crate::backend::{AuthBackend, BackendError, BackendSession, Credentials, Registration};
use crate::navigation::RecordingNavigator;
use crate::principal::Role;
use crate::session::SessionStore;
use crate::storage::InMemoryKeyValueStore;

fn not_configured<T>() -> Result<T, BackendError> {
    Err(BackendError::Network("mock response not configured".to_string()))
}

/// Scripted [`AuthBackend`] that records every call it receives.
#[derive(Default)]
pub(crate) struct MockBackend {
    login: Mutex<Option<Result<BackendSession, BackendError>>>,
    register: Mutex<Option<Result<Option<BackendSession>, BackendError>>>,
    logout: Mutex<Option<Result<(), BackendError>>>,
    profile: Mutex<Option<Result<Value, BackendError>>>,
    refresh: Mutex<Option<Result<BackendSession, BackendError>>>,
    authorize_url: Mutex<Option<Result<String, BackendError>>>,
    oauth_profile: Mutex<Option<Result<Value, BackendError>>>,
    login_gate: Mutex<Option<Arc<Notify>>>,
    oauth_gate: Mutex<Option<Arc<Notify>>>,
    calls: Mutex<Vec<String>>,
}

impl MockBackend {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn on_login(&self, response: Result<BackendSession, BackendError>) {
        *self.login.lock().unwrap() = Some(response);
    }

    pub(crate) fn on_register(&self, response: Result<Option<BackendSession>, BackendError>) {
        *self.register.lock().unwrap() = Some(response);
    }

    pub(crate) fn on_logout(&self, response: Result<(), BackendError>) {
        *self.logout.lock().unwrap() = Some(response);
    }

    pub(crate) fn on_profile(&self, response: Result<Value, BackendError>) {
        *self.profile.lock().unwrap() = Some(response);
    }

    pub(crate) fn on_refresh(&self, response: Result<BackendSession, BackendError>) {
        *self.refresh.lock().unwrap() = Some(response);
    }

    pub(crate) fn on_authorize_url(&self, response: Result<String, BackendError>) {
        *self.authorize_url.lock().unwrap() = Some(response);
    }

    pub(crate) fn on_oauth_profile(&self, response: Result<Value, BackendError>) {
        *self.oauth_profile.lock().unwrap() = Some(response);
    }

    /// Make `login` wait until the returned notify is signalled.
    pub(crate) fn gate_login(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.login_gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    /// Make `oauth_complete` wait until the returned notify is signalled.
    pub(crate) fn gate_oauth(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.oauth_gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

fn scripted<T: Clone>(slot: &Mutex<Option<Result<T, BackendError>>>) -> Result<T, BackendError> {
    slot.lock().unwrap().clone().unwrap_or_else(not_configured)
}

#[async_trait]
impl AuthBackend for MockBackend {
    async fn login(
        &self,
        role: Role,
        credentials: &Credentials,
    ) -> Result<BackendSession, BackendError> {
        self.record(format!("login:{role}:{}", credentials.email));
        let gate = self.login_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        scripted(&self.login)
    }

    async fn register(
        &self,
        role: Role,
        registration: &Registration,
    ) -> Result<Option<BackendSession>, BackendError> {
        self.record(format!("register:{role}:{}", registration.email));
        scripted(&self.register)
    }

    async fn logout(&self, role: Role, access_token: &str) -> Result<(), BackendError> {
        self.record(format!("logout:{role}:{access_token}"));
        scripted(&self.logout)
    }

    async fn get_profile(&self, role: Role, access_token: &str) -> Result<Value, BackendError> {
        self.record(format!("profile:{role}:{access_token}"));
        scripted(&self.profile)
    }

    async fn refresh(
        &self,
        role: Role,
        access_token: &str,
    ) -> Result<BackendSession, BackendError> {
        self.record(format!("refresh:{role}:{access_token}"));
        scripted(&self.refresh)
    }

    async fn oauth_authorize_url(&self, role: Role) -> Result<String, BackendError> {
        self.record(format!("authorize_url:{role}"));
        scripted(&self.authorize_url)
    }

    async fn oauth_complete(&self, access_token: &str) -> Result<Value, BackendError> {
        self.record(format!("oauth_complete:{access_token}"));
        let gate = self.oauth_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        scripted(&self.oauth_profile)
    }
}

/// A portal wired to an in-memory store, a [`MockBackend`] and a
/// [`RecordingNavigator`].
pub(crate) struct TestPortal {
    pub(crate) portal: PortalAuth,
    pub(crate) backend: Arc<MockBackend>,
    pub(crate) navigator: Arc<RecordingNavigator>,
    pub(crate) kv: Arc<InMemoryKeyValueStore>,
}

impl TestPortal {
    pub(crate) fn new() -> Self {
        let kv = Arc::new(InMemoryKeyValueStore::new());
        let backend = Arc::new(MockBackend::new());
        let navigator = Arc::new(RecordingNavigator::new());
        let portal = PortalAuth::new(
            SessionStore::new(kv.clone()),
            backend.clone(),
            navigator.clone(),
        );
        Self {
            portal,
            backend,
            navigator,
            kv,
        }
    }

    /// Every key currently present in the shared store.
    pub(crate) fn stored_keys(&self) -> Vec<String> {
        use crate::storage::KeyValueStore;
        self.kv.keys().unwrap()
    }
}

pub(crate) fn doctor_json(status: &str) -> Value {
    json!({
        "_id": "d-1",
        "role": "doctor",
        "fullName": "Dr. Asha Rao",
        "email": "asha@example.com",
        "specialization": "Cardiology",
        "status": status,
    })
}

pub(crate) fn patient_json() -> Value {
    json!({
        "id": "p-7",
        "role": "patient",
        "name": "Ravi Kumar",
        "email": "ravi@example.com",
        "uhid": "UH123456",
    })
}

pub(crate) fn admin_json(role: &str) -> Value {
    json!({
        "id": "a-1",
        "role": role,
        "name": "Ops Admin",
        "email": "ops@example.com",
    })
}

pub(crate) fn coordinator_json() -> Value {
    json!({
        "id": "c-3",
        "role": "coordinator",
        "name": "Meera",
        "hospital": { "_id": "h-9", "name": "City Hospital" },
    })
}
