use std::time::Duration;

use tokio::sync::watch;

use crate::auth::{AuthError, PortalAuth, check_account_status};
use crate::config::{OAUTH_ERROR_REDIRECT_DELAY, OAUTH_SUCCESS_REDIRECT_DELAY};
use crate::navigation::{DOCTOR_LOGIN, landing_route};
use crate::principal::{Principal, Role, normalize_principal};
use crate::session::{Session, SessionStore};

use super::params::OAuthCallbackParams;

/// Namespace the redirect token is staged in until its principal is known.
const PROVISIONAL_NAMESPACE: Role = Role::Doctor;

#[derive(Debug, Clone, PartialEq)]
pub enum OAuthPhase {
    Loading,
    Success(Principal),
    Error(String),
    Done,
}

/// Token written before its principal is validated.
///
/// Unless committed, dropping it removes the token again (only if the
/// namespace still holds it) and puts back the session it displaced once
/// the namespace holds no valid session of its own.
struct ProvisionalToken<'a> {
    store: &'a SessionStore,
    token: String,
    displaced: Option<Session>,
    committed: bool,
}

impl<'a> ProvisionalToken<'a> {
    fn stage(store: &'a SessionStore, token: &str) -> Result<Self, AuthError> {
        let displaced = store.load(PROVISIONAL_NAMESPACE)?;
        store.stage_token(PROVISIONAL_NAMESPACE, token)?;
        Ok(Self {
            store,
            token: token.to_string(),
            displaced,
            committed: false,
        })
    }

    fn commit(mut self) {
        self.committed = true;
    }
}

impl Drop for ProvisionalToken<'_> {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        match self.store.clear_if_token(PROVISIONAL_NAMESPACE, &self.token) {
            Ok(true) => tracing::debug!("Removed provisional OAuth token"),
            Ok(false) => {}
            Err(e) => {
                tracing::error!("Failed to remove provisional OAuth token: {}", e);
                return;
            }
        }

        let Some(displaced) = self.displaced.take() else {
            return;
        };
        match self.store.load(PROVISIONAL_NAMESPACE) {
            Ok(None) => {
                if let Err(e) = self.store.save(PROVISIONAL_NAMESPACE, &displaced) {
                    tracing::error!("Failed to restore displaced session: {}", e);
                } else {
                    tracing::debug!("Restored displaced {} session", PROVISIONAL_NAMESPACE);
                }
            }
            Ok(Some(_)) => {}
            Err(e) => tracing::error!("Failed to inspect {} session: {}", PROVISIONAL_NAMESPACE, e),
        }
    }
}

/// Handshake run by the OAuth callback view.
///
/// Consumes the callback parameters exactly once and ends in
/// [`OAuthPhase::Done`] after navigating either to the principal's landing
/// route or back to the doctor login.
pub struct OAuthCompletion<'a> {
    portal: &'a PortalAuth,
    phase: watch::Sender<OAuthPhase>,
    error_delay: Duration,
    success_delay: Duration,
}

impl<'a> OAuthCompletion<'a> {
    pub fn new(portal: &'a PortalAuth) -> Self {
        let (phase, _) = watch::channel(OAuthPhase::Loading);
        Self {
            portal,
            phase,
            error_delay: *OAUTH_ERROR_REDIRECT_DELAY,
            success_delay: *OAUTH_SUCCESS_REDIRECT_DELAY,
        }
    }

    pub fn with_delays(mut self, error_delay: Duration, success_delay: Duration) -> Self {
        self.error_delay = error_delay;
        self.success_delay = success_delay;
        self
    }

    pub fn phase(&self) -> OAuthPhase {
        self.phase.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<OAuthPhase> {
        self.phase.subscribe()
    }

    pub async fn run(self, params: OAuthCallbackParams) -> Result<Principal, AuthError> {
        self.phase.send_replace(OAuthPhase::Loading);

        match self.complete(&params).await {
            Ok(principal) => {
                tracing::info!(
                    "OAuth sign-in completed for {} {}",
                    principal.role,
                    principal.id
                );
                self.phase.send_replace(OAuthPhase::Success(principal.clone()));
                tokio::time::sleep(self.success_delay).await;
                self.portal
                    .navigator()
                    .navigate(landing_route(principal.role, principal.account_status));
                self.phase.send_replace(OAuthPhase::Done);
                Ok(principal)
            }
            Err(e) => {
                let e = e.log();
                self.phase.send_replace(OAuthPhase::Error(e.to_string()));
                tokio::time::sleep(self.error_delay).await;
                self.portal.navigator().navigate(DOCTOR_LOGIN);
                self.phase.send_replace(OAuthPhase::Done);
                Err(e)
            }
        }
    }

    async fn complete(&self, params: &OAuthCallbackParams) -> Result<Principal, AuthError> {
        if let Some(error) = &params.error {
            let message = params.error_description.as_ref().unwrap_or(error);
            return Err(AuthError::OAuthProviderError(message.clone()));
        }
        let token = params
            .access_token
            .as_deref()
            .ok_or(AuthError::OAuthMissingToken)?;

        let provisional = ProvisionalToken::stage(self.portal.store(), token)?;

        let raw = self.portal.backend().oauth_complete(token).await?;
        let principal = normalize_principal(&raw, None)?;
        check_account_status(&principal)?;

        let service = self.portal.service(principal.role);
        service.adopt(&Session::new(token, principal.clone()))?;

        if service.role() == PROVISIONAL_NAMESPACE {
            provisional.commit();
        } else {
            drop(provisional);
        }
        Ok(principal)
    }
}
