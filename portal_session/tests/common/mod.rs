pub mod mock_portal_server;

use std::sync::{Arc, Once};

use portal_session::{
    HttpBackend, InMemoryKeyValueStore, KeyValueStore, PortalAuth, RecordingNavigator,
    SessionStore,
};

pub use mock_portal_server::{MockPortalServer, PASSWORD};

/// Load `.env_test` (falling back to `.env`) once per test binary.
pub fn init_test_environment() {
    static ENV_INIT: Once = Once::new();
    ENV_INIT.call_once(|| {
        if dotenvy::from_filename(".env_test").is_err() {
            dotenvy::dotenv().ok();
        }
    });
}

/// A portal talking HTTP to a [`MockPortalServer`].
pub struct TestClient {
    pub portal: PortalAuth,
    pub navigator: Arc<RecordingNavigator>,
    pub kv: Arc<dyn KeyValueStore>,
}

impl TestClient {
    pub fn new(server: &MockPortalServer) -> Self {
        Self::with_store(server, Arc::new(InMemoryKeyValueStore::new()))
    }

    pub fn with_store(server: &MockPortalServer, kv: Arc<dyn KeyValueStore>) -> Self {
        init_test_environment();
        let backend = HttpBackend::new(&server.base_url)
            .expect("Failed to create HTTP backend")
            .with_redirect_uri("http://127.0.0.1:3000/auth/callback");
        let navigator = Arc::new(RecordingNavigator::new());
        let portal = PortalAuth::new(
            SessionStore::new(kv.clone()),
            Arc::new(backend),
            navigator.clone(),
        );
        portal.bootstrap_all();
        Self {
            portal,
            navigator,
            kv,
        }
    }

    pub fn stored_keys(&self) -> Vec<String> {
        self.kv.keys().expect("Failed to list keys")
    }
}
