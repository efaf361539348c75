use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use http::StatusCode;
use serde_json::Value;
use tokio::sync::watch;

use crate::backend::{AuthBackend, BackendError, BackendSession, Credentials, Registration};
use crate::config::TOKEN_EXPIRY_LEEWAY_SECS;
use crate::navigation::{Navigator, landing_route, login_route};
use crate::principal::{AccountStatus, Principal, Role, normalize_principal};
use crate::session::{Session, SessionStore, is_expired};

use super::errors::AuthError;
use super::state::AuthState;

/// What a successful registration led to.
#[derive(Debug, Clone, PartialEq)]
pub enum RegistrationOutcome {
    /// The backend opened a session right away and the user is signed in
    SignedIn(Principal),
    /// The account exists but an administrator has to approve it first
    PendingApproval,
    /// The account exists and the user can sign in with it
    Registered,
}

/// Reject principals whose account may not hold a session.
pub(crate) fn check_account_status(principal: &Principal) -> Result<(), AuthError> {
    match principal.account_status {
        AccountStatus::Active => Ok(()),
        AccountStatus::PendingVerification => Err(AuthError::AccountPendingVerification),
        AccountStatus::Suspended => Err(AuthError::AccountSuspended),
    }
}

/// Session lifecycle of one role namespace.
///
/// The service owns the observable [`AuthState`] of its portal. Every
/// asynchronous operation takes a ticket when it starts; a response that
/// arrives after a newer operation, a logout or [`unmount`](Self::unmount)
/// is discarded with [`AuthError::Superseded`] and changes nothing.
pub struct RoleAuthService {
    role: Role,
    store: SessionStore,
    backend: Arc<dyn AuthBackend>,
    navigator: Arc<dyn Navigator>,
    state: watch::Sender<AuthState>,
    epoch: AtomicU64,
    /// Ticket of the operation that raised `is_loading`, 0 when none did
    loading_owner: AtomicU64,
    mounted: AtomicBool,
    bootstrapped: AtomicBool,
    expiry_leeway_secs: i64,
}

impl RoleAuthService {
    pub fn new(
        role: Role,
        store: SessionStore,
        backend: Arc<dyn AuthBackend>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        let (state, _) = watch::channel(AuthState::initial());
        Self {
            role: role.namespace(),
            store,
            backend,
            navigator,
            state,
            epoch: AtomicU64::new(0),
            loading_owner: AtomicU64::new(0),
            mounted: AtomicBool::new(true),
            bootstrapped: AtomicBool::new(false),
            expiry_leeway_secs: *TOKEN_EXPIRY_LEEWAY_SECS,
        }
    }

    pub fn with_expiry_leeway(mut self, leeway_secs: i64) -> Self {
        self.expiry_leeway_secs = leeway_secs;
        self
    }

    /// Namespace this service manages.
    pub fn role(&self) -> Role {
        self.role
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> AuthState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated
    }

    pub fn principal(&self) -> Option<Principal> {
        self.state.borrow().principal.clone()
    }

    pub fn is_bootstrapped(&self) -> bool {
        self.bootstrapped.load(Ordering::SeqCst)
    }

    /// Restore the session persisted for this namespace.
    ///
    /// Never suspends. Expired tokens and entries that fail validation are
    /// removed and the service comes up signed out.
    pub fn bootstrap(&self) -> Option<Session> {
        self.mounted.store(true, Ordering::SeqCst);
        self.begin();

        let session = match self.store.load(self.role) {
            Ok(Some(session)) if is_expired(&session.access_token, self.expiry_leeway_secs) => {
                tracing::info!("Stored {} session has expired", self.role);
                self.discard_local();
                None
            }
            Ok(session) => session,
            Err(e) => {
                tracing::warn!("Failed to restore {} session: {}", self.role, e);
                self.discard_local();
                None
            }
        };

        match &session {
            Some(session) => {
                tracing::debug!(
                    "Restored {} session for {}",
                    self.role,
                    session.principal.id
                );
                self.state.send_replace(AuthState::authenticated(session));
            }
            None => {
                self.state.send_replace(AuthState::signed_out());
            }
        }
        self.bootstrapped.store(true, Ordering::SeqCst);
        session
    }

    /// The owning view went away. Responses still in flight are discarded.
    pub fn unmount(&self) {
        self.mounted.store(false, Ordering::SeqCst);
        self.begin();
    }

    /// Exchange credentials for a session in this namespace.
    ///
    /// On success the session is persisted, the state becomes authenticated
    /// and the navigator is sent to the principal's landing route.
    pub async fn login(&self, credentials: &Credentials) -> Result<Principal, AuthError> {
        let ticket = self.begin_loading();
        tracing::debug!("Signing in to {} portal as {}", self.role, credentials.email);

        let result = self.backend.login(self.role, credentials).await;
        if !self.is_current(ticket) {
            return Err(AuthError::Superseded.log());
        }

        let session = match result
            .map_err(AuthError::from)
            .and_then(|response| self.session_from_response(response))
        {
            Ok(session) => session,
            Err(e) => return Err(self.fail(e)),
        };

        if let Err(e) = self.commit(&session) {
            return Err(self.fail(e));
        }
        tracing::info!(
            "Signed in {} {} to {} portal",
            session.principal.role,
            session.principal.id,
            self.role
        );
        self.dispatch(&session.principal);
        Ok(session.principal)
    }

    /// Create an account in this namespace.
    ///
    /// Only patients are signed in straight away when the backend opens a
    /// session. Doctors always wait for approval and the other roles are
    /// sent to sign in.
    pub async fn register(
        &self,
        registration: &Registration,
    ) -> Result<RegistrationOutcome, AuthError> {
        let ticket = self.begin_loading();

        let result = self.backend.register(self.role, registration).await;
        if !self.is_current(ticket) {
            return Err(AuthError::Superseded.log());
        }

        let response = match result {
            Ok(response) => response,
            Err(e) => return Err(self.fail(e.into())),
        };

        let outcome = match (self.role, response) {
            (Role::Patient, Some(response)) if response.access_token.is_some() => {
                match self.session_from_response(response) {
                    Ok(session) => {
                        if let Err(e) = self.commit(&session) {
                            return Err(self.fail(e));
                        }
                        self.dispatch(&session.principal);
                        return Ok(RegistrationOutcome::SignedIn(session.principal));
                    }
                    Err(AuthError::AccountPendingVerification) => {
                        RegistrationOutcome::PendingApproval
                    }
                    Err(e) => return Err(self.fail(e)),
                }
            }
            (Role::Doctor, response) => {
                if response.is_some_and(|r| r.access_token.is_some()) {
                    tracing::debug!("Ignoring session returned for doctor registration");
                }
                RegistrationOutcome::PendingApproval
            }
            _ => RegistrationOutcome::Registered,
        };

        tracing::info!(
            "Registered {} in {} portal: {:?}",
            registration.email,
            self.role,
            outcome
        );
        self.state.send_modify(|s| {
            s.is_loading = false;
            s.error = None;
        });
        Ok(outcome)
    }

    /// End the session in this namespace.
    ///
    /// The local session is always destroyed and the navigator sent to the
    /// login route. Revoking the token on the server is best effort.
    pub async fn logout(&self) {
        self.begin();
        let token = self.current_token();

        self.discard_local();
        self.state.send_replace(AuthState::signed_out());
        self.navigator.navigate(login_route(self.role));
        tracing::info!("Signed out of {} portal", self.role);

        if let Some(token) = token {
            if let Err(e) = self.backend.logout(self.role, &token).await {
                tracing::warn!("Failed to revoke {} token on server: {}", self.role, e);
            }
        }
    }

    /// Fetch the current principal again and persist it, keeping the token.
    pub async fn refresh_principal(&self) -> Result<Principal, AuthError> {
        let token = self.current_token().ok_or(AuthError::NotAuthenticated)?;
        let ticket = self.begin();

        let result = self.backend.get_profile(self.role, &token).await;
        if !self.is_current(ticket) {
            return Err(AuthError::Superseded.log());
        }

        let raw = match result {
            Ok(raw) => raw,
            Err(e) => return Err(self.fail_refresh(e)),
        };
        let principal = match self.validate_principal(&raw) {
            Ok(principal) => principal,
            Err(e) => return Err(self.fail(e)),
        };
        if let Err(e) = check_account_status(&principal) {
            return Err(self.end_inactive(&principal, e));
        }

        if let Err(e) = self.store.update_principal(self.role, &principal) {
            return Err(self.fail(e.into()));
        }
        self.state.send_modify(|s| {
            s.principal = Some(principal.clone());
            s.error = None;
        });
        Ok(principal)
    }

    /// Exchange the current token for a fresh one.
    pub async fn refresh_token(&self) -> Result<(), AuthError> {
        let token = self.current_token().ok_or(AuthError::NotAuthenticated)?;
        let ticket = self.begin();

        let result = self.backend.refresh(self.role, &token).await;
        if !self.is_current(ticket) {
            return Err(AuthError::Superseded.log());
        }

        let response = match result {
            Ok(response) => response,
            Err(e) => return Err(self.fail_refresh(e)),
        };
        let Some(new_token) = response.access_token.filter(|t| !t.trim().is_empty()) else {
            return Err(self.fail(AuthError::InvalidResponse(
                "No access token in refresh response".to_string(),
            )));
        };
        let principal = match response.principal.as_ref().map(|raw| self.validate_principal(raw)) {
            Some(Ok(principal)) => Some(principal),
            Some(Err(e)) => return Err(self.fail(e)),
            None => None,
        };
        if let Some(principal) = &principal {
            if let Err(e) = check_account_status(principal) {
                return Err(self.end_inactive(principal, e));
            }
        }

        let persisted = self.store.update_token(self.role, &new_token).and_then(|()| {
            match &principal {
                Some(principal) => self.store.update_principal(self.role, principal),
                None => Ok(()),
            }
        });
        if let Err(e) = persisted {
            return Err(self.fail(e.into()));
        }

        tracing::debug!("Refreshed {} token", self.role);
        self.state.send_modify(|s| {
            s.token = Some(new_token);
            if principal.is_some() {
                s.principal = principal;
            }
            s.error = None;
        });
        Ok(())
    }

    /// URL of the external identity provider for this namespace.
    pub async fn authorize_url(&self) -> Result<String, AuthError> {
        self.backend
            .oauth_authorize_url(self.role)
            .await
            .map_err(|e| AuthError::from(e).log())
    }

    /// Install a session obtained outside of [`login`](Self::login).
    pub(crate) fn adopt(&self, session: &Session) -> Result<(), AuthError> {
        self.begin();
        self.commit(session)
    }

    pub(crate) fn navigate(&self, route: &str) {
        self.navigator.navigate(route);
    }

    /// Take a ticket for a new operation. A superseded operation never
    /// finishes, so the loading flag it raised is released here.
    fn begin(&self) -> u64 {
        let ticket = self.next_ticket();
        if self.loading_owner.swap(0, Ordering::SeqCst) != 0 {
            self.state.send_if_modified(|s| std::mem::replace(&mut s.is_loading, false));
        }
        ticket
    }

    fn is_current(&self, ticket: u64) -> bool {
        self.mounted.load(Ordering::SeqCst) && self.epoch.load(Ordering::SeqCst) == ticket
    }

    /// Take a ticket for an operation that shows progress until it settles.
    fn begin_loading(&self) -> u64 {
        let ticket = self.next_ticket();
        self.loading_owner.store(ticket, Ordering::SeqCst);
        self.state.send_modify(|s| {
            s.is_loading = true;
            s.error = None;
        });
        ticket
    }

    fn next_ticket(&self) -> u64 {
        self.epoch.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn current_token(&self) -> Option<String> {
        let token = self.state.borrow().token.clone();
        token.or_else(|| self.store.token(self.role).ok().flatten())
    }

    fn validate_principal(&self, raw: &Value) -> Result<Principal, AuthError> {
        let principal = normalize_principal(raw, Some(self.role))?;
        if !principal.role.shares_namespace(self.role) {
            return Err(AuthError::RoleMismatch {
                expected: self.role,
                actual: principal.role,
            });
        }
        Ok(principal)
    }

    fn session_from_response(&self, response: BackendSession) -> Result<Session, AuthError> {
        let token = response
            .access_token
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| AuthError::InvalidResponse("No access token in response".to_string()))?;
        let raw = response
            .principal
            .ok_or_else(|| AuthError::InvalidResponse("No user in response".to_string()))?;

        let principal = self.validate_principal(&raw)?;
        check_account_status(&principal)?;
        Ok(Session::new(token, principal))
    }

    fn commit(&self, session: &Session) -> Result<(), AuthError> {
        self.store.save(self.role, session)?;
        self.state.send_replace(AuthState::authenticated(session));
        Ok(())
    }

    fn dispatch(&self, principal: &Principal) {
        self.navigator
            .navigate(landing_route(principal.role, principal.account_status));
    }

    /// Record a failed operation in the state. The session, if any, is kept.
    fn fail(&self, error: AuthError) -> AuthError {
        let error = error.log();
        let message = (!error.is_silent()).then(|| error.to_string());
        self.state.send_modify(|s| {
            s.is_loading = false;
            s.error = message;
        });
        error
    }

    /// The account behind the session was suspended or sent back to review.
    fn end_inactive(&self, principal: &Principal, error: AuthError) -> AuthError {
        tracing::warn!("{} account {} is no longer active", self.role, principal.id);
        self.discard_local();
        self.state.send_replace(AuthState::signed_out());
        error.log()
    }

    /// A refresh rejected with 401 means the token is dead.
    fn fail_refresh(&self, error: BackendError) -> AuthError {
        if error.status() == Some(StatusCode::UNAUTHORIZED) {
            tracing::info!("{} token was rejected, signing out locally", self.role);
            self.discard_local();
            self.state.send_replace(AuthState::signed_out());
            return AuthError::NotAuthenticated.log();
        }
        self.fail(error.into())
    }

    fn discard_local(&self) {
        if let Err(e) = self.store.clear(self.role) {
            tracing::error!("Failed to clear {} session: {}", self.role, e);
        }
    }
}
