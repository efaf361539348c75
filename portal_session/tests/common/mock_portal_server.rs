//! Axum-based mock of the portal REST backend
//!
//! Each test starts its own server on an ephemeral port, so tests never share
//! state and can run in parallel.

use axum::{
    Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    response::Json,
    routing::{get, post},
};
use serde_json::{Value, json};
use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
    },
};
use tokio::task::JoinHandle;

pub const PASSWORD: &str = "secret";

/// A registered account of the mock backend.
struct Account {
    email: &'static str,
    token: &'static str,
    principal: fn() -> Value,
}

fn doctor() -> Value {
    json!({
        "_id": "d-1",
        "role": "doctor",
        "fullName": "Dr. Asha Rao",
        "email": "asha@example.com",
        "specialization": "Cardiology",
        "accountStatus": "active",
    })
}

fn pending_doctor() -> Value {
    json!({
        "_id": "d-2",
        "role": "doctor",
        "fullName": "Dr. New Joiner",
        "email": "pending@example.com",
        "accountStatus": "pending_verification",
    })
}

fn patient() -> Value {
    json!({
        "id": 7,
        "role": "patient",
        "firstName": "Ravi",
        "lastName": "Kumar",
        "email": "ravi@example.com",
        "uhid": "UH123456",
    })
}

fn coordinator() -> Value {
    json!({
        "id": "c-3",
        "role": "coordinator",
        "name": "Meera",
        "email": "meera@example.com",
        "hospital": { "_id": "h-9", "name": "City Hospital" },
    })
}

fn super_admin() -> Value {
    json!({
        "id": "a-1",
        "role": "superAdmin",
        "name": "Root",
        "email": "root@example.com",
    })
}

const ACCOUNTS: &[Account] = &[
    Account {
        email: "asha@example.com",
        token: "doctor-token",
        principal: doctor,
    },
    Account {
        email: "pending@example.com",
        token: "pending-token",
        principal: pending_doctor,
    },
    Account {
        email: "ravi@example.com",
        token: "patient-token",
        principal: patient,
    },
    Account {
        email: "meera@example.com",
        token: "coordinator-token",
        principal: coordinator,
    },
    Account {
        email: "root@example.com",
        token: "root-token",
        principal: super_admin,
    },
];

fn account_by_token(token: &str) -> Option<&'static Account> {
    ACCOUNTS
        .iter()
        .find(|account| token == account.token || token == format!("{}-refreshed", account.token))
}

/// Shared state for the mock server
#[derive(Clone, Default)]
pub struct MockPortalState {
    /// Tokens the client asked to revoke, in order
    pub revoked: Arc<Mutex<Vec<String>>>,
    /// Answer logout with a server error
    pub fail_logout: Arc<AtomicBool>,
    /// Name returned by the profile endpoint instead of the stored one
    pub profile_name: Arc<Mutex<Option<String>>>,
    /// `redirect_uri` values received by the authorize URL endpoint
    pub redirect_uris: Arc<Mutex<Vec<String>>>,
}

/// A running mock backend. The server task stops when this is dropped.
pub struct MockPortalServer {
    pub base_url: String,
    pub state: MockPortalState,
    handle: JoinHandle<()>,
}

impl MockPortalServer {
    pub async fn start() -> Self {
        let state = MockPortalState::default();
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock portal server");
        let addr = listener
            .local_addr()
            .expect("Failed to read mock portal server address");

        let app = create_mock_app(state.clone());
        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                eprintln!("Mock portal server error: {e}");
            }
        });

        Self {
            base_url: format!("http://{addr}/api"),
            state,
            handle,
        }
    }
}

impl Drop for MockPortalServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn create_mock_app(state: MockPortalState) -> Router {
    Router::new()
        .route("/api/{role}/auth/login", post(login))
        .route("/api/{role}/auth/register", post(register))
        .route("/api/{role}/auth/logout", post(logout))
        .route("/api/{role}/auth/me", get(me))
        .route("/api/{role}/auth/refresh", post(refresh))
        .route("/api/{role}/auth/oauth/url", get(oauth_url))
        .route("/api/auth/oauth/session", get(oauth_session))
        .with_state(state)
}

fn bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::to_string)
}

fn unauthorized() -> (StatusCode, Json<Value>) {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "success": false, "error": "Unauthorized" })),
    )
}

/// Each role route wraps its session differently, as the real backend does.
async fn login(Path(role): Path<String>, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    let email = body["email"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();

    let Some(account) = ACCOUNTS.iter().find(|a| a.email == email) else {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "Invalid email or password" })),
        );
    };
    if password != PASSWORD {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "Invalid email or password" })),
        );
    }

    let principal = (account.principal)();
    let body = match role.as_str() {
        "doctor" => json!({
            "success": true,
            "data": { "accessToken": account.token, "doctor": principal },
        }),
        "patient" => json!({ "token": account.token, "user": principal }),
        _ => json!({ "access_token": account.token, "user": principal }),
    };
    (StatusCode::OK, Json(body))
}

async fn register(Path(role): Path<String>, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    let email = body["email"].as_str().unwrap_or_default();
    if ACCOUNTS.iter().any(|a| a.email == email) {
        return (
            StatusCode::CONFLICT,
            Json(json!({ "message": "Email already registered" })),
        );
    }

    let body = match role.as_str() {
        "patient" => json!({
            "token": "new-patient-token",
            "user": {
                "id": "p-new",
                "role": "patient",
                "name": body["name"],
                "email": email,
                "dateOfBirth": body["dateOfBirth"],
            },
        }),
        "doctor" => json!({
            "message": "Registration submitted. Your account is pending verification.",
        }),
        _ => json!({ "success": true }),
    };
    (StatusCode::CREATED, Json(body))
}

async fn logout(
    State(state): State<MockPortalState>,
    headers: HeaderMap,
) -> (StatusCode, Json<Value>) {
    let Some(token) = bearer(&headers) else {
        return unauthorized();
    };
    state.revoked.lock().unwrap().push(token);

    if state.fail_logout.load(Ordering::SeqCst) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "message": "Session service unavailable" })),
        );
    }
    (StatusCode::OK, Json(json!({ "success": true })))
}

async fn me(State(state): State<MockPortalState>, headers: HeaderMap) -> (StatusCode, Json<Value>) {
    let Some(account) = bearer(&headers).as_deref().and_then(account_by_token) else {
        return unauthorized();
    };

    let mut principal = (account.principal)();
    if let Some(name) = state.profile_name.lock().unwrap().clone() {
        principal["name"] = json!(name);
    }
    (StatusCode::OK, Json(json!({ "user": principal })))
}

async fn refresh(headers: HeaderMap) -> (StatusCode, Json<Value>) {
    let Some(account) = bearer(&headers).as_deref().and_then(account_by_token) else {
        return unauthorized();
    };
    (
        StatusCode::OK,
        Json(json!({ "accessToken": format!("{}-refreshed", account.token) })),
    )
}

async fn oauth_url(
    State(state): State<MockPortalState>,
    Path(role): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Value> {
    let redirect_uri = query.get("redirect_uri").cloned().unwrap_or_default();
    state.redirect_uris.lock().unwrap().push(redirect_uri);
    Json(json!({
        "authorizeUrl": format!("https://accounts.example.com/o/oauth2/v2/auth?state={role}"),
    }))
}

async fn oauth_session(headers: HeaderMap) -> (StatusCode, Json<Value>) {
    match bearer(&headers).as_deref() {
        Some("oauth-doctor") => (StatusCode::OK, Json(json!({ "data": { "user": doctor() } }))),
        Some("oauth-patient") => (StatusCode::OK, Json(json!({ "user": patient() }))),
        Some("oauth-pending") => (StatusCode::OK, Json(pending_doctor())),
        _ => unauthorized(),
    }
}
