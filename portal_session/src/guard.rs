//! Access decisions for role-protected views

use crate::auth::{AuthState, RoleAuthService};
use crate::navigation::login_route;
use crate::principal::{Principal, Role};

#[derive(Debug, Clone, PartialEq)]
pub enum GuardDecision {
    /// Bootstrap or an operation is still running; render a placeholder
    Loading,
    Render(Principal),
    Redirect(&'static str),
}

/// Gate in front of the views that require `required`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteGuard {
    required: Role,
}

impl RouteGuard {
    pub fn new(required: Role) -> Self {
        Self { required }
    }

    pub fn required(&self) -> Role {
        self.required
    }

    /// Decide from a state snapshot. Never has side effects.
    pub fn decide(&self, state: &AuthState) -> GuardDecision {
        if state.is_loading {
            return GuardDecision::Loading;
        }
        match &state.principal {
            Some(principal) if state.is_authenticated && principal.role.satisfies(self.required) => {
                GuardDecision::Render(principal.clone())
            }
            _ => GuardDecision::Redirect(login_route(self.required)),
        }
    }

    /// Decide for `service`, bootstrapping it first if that has not happened,
    /// and follow a redirect through the service's navigator.
    pub fn enforce(&self, service: &RoleAuthService) -> GuardDecision {
        if !service.is_bootstrapped() {
            service.bootstrap();
        }
        self.follow(service, self.decide(&service.state()))
    }

    /// Like [`enforce`](Self::enforce) but waits out a running login or
    /// registration instead of answering [`GuardDecision::Loading`].
    pub async fn resolve(&self, service: &RoleAuthService) -> GuardDecision {
        if !service.is_bootstrapped() {
            service.bootstrap();
        }
        let mut state = service.subscribe();
        let decision = match state.wait_for(|s| !s.is_loading).await {
            Ok(settled) => self.decide(&settled),
            Err(_) => self.decide(&service.state()),
        };
        self.follow(service, decision)
    }

    fn follow(&self, service: &RoleAuthService, decision: GuardDecision) -> GuardDecision {
        if let GuardDecision::Redirect(route) = &decision {
            tracing::debug!(
                "{} view requires {}, redirecting to {}",
                service.role(),
                self.required,
                route
            );
            service.navigate(route);
        }
        decision
    }
}
