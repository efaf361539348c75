//! Error types surfaced by the role auth services

use http::StatusCode;
use thiserror::Error;

use crate::backend::BackendError;
use crate::principal::{NormalizeError, Role};
use crate::session::SessionError;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum AuthError {
    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    #[error(
        "Your account is pending verification. You can sign in once an administrator approves it."
    )]
    AccountPendingVerification,

    #[error("Your account has been suspended. Please contact support.")]
    AccountSuspended,

    #[error("Network failure: {0}")]
    NetworkFailure(String),

    #[error("No token received from the authentication provider")]
    OAuthMissingToken,

    #[error("Authentication provider error: {0}")]
    OAuthProviderError(String),

    /// Stored session failed validation. Handled by clearing it, never shown.
    #[error("Corrupt session: {0}")]
    SessionCorrupt(String),

    #[error("This account belongs to the {actual} portal, not the {expected} portal")]
    RoleMismatch { expected: Role, actual: Role },

    #[error("Invalid response from server: {0}")]
    InvalidResponse(String),

    #[error("Request failed ({status}): {message}")]
    Backend { status: u16, message: String },

    #[error("Not signed in")]
    NotAuthenticated,

    /// A newer operation, a logout or an unmount made this response stale
    #[error("Superseded by a newer request")]
    Superseded,

    #[error("Storage error: {0}")]
    Storage(String),
}

impl AuthError {
    /// Errors that are handled internally and must not reach the user.
    pub fn is_silent(&self) -> bool {
        matches!(self, Self::SessionCorrupt(_) | Self::Superseded)
    }

    /// Log the error at a level matching its kind and return self.
    pub fn log(self) -> Self {
        match &self {
            Self::SessionCorrupt(_) | Self::Superseded => tracing::debug!("{}", self),
            Self::InvalidCredentials(_)
            | Self::AccountPendingVerification
            | Self::AccountSuspended
            | Self::NotAuthenticated
            | Self::RoleMismatch { .. } => tracing::warn!("{}", self),
            _ => tracing::error!("{}", self),
        }
        self
    }

    /// Recognize account-status rejections the backend reports as plain messages.
    fn from_status_message(message: &str) -> Option<Self> {
        let lower = message.to_lowercase();
        if lower.contains("pending verification")
            || lower.contains("pending_verification")
            || lower.contains("not yet verified")
        {
            Some(Self::AccountPendingVerification)
        } else if lower.contains("suspended") {
            Some(Self::AccountSuspended)
        } else {
            None
        }
    }
}

impl From<BackendError> for AuthError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Network(message) => Self::NetworkFailure(message),
            BackendError::InvalidResponse(message) => Self::InvalidResponse(message),
            BackendError::Status { status, message } => {
                if let Some(error) = Self::from_status_message(&message) {
                    return error;
                }
                match status {
                    StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                        Self::InvalidCredentials(message)
                    }
                    status => Self::Backend {
                        status: status.as_u16(),
                        message,
                    },
                }
            }
        }
    }
}

impl From<NormalizeError> for AuthError {
    fn from(err: NormalizeError) -> Self {
        Self::InvalidResponse(err.to_string())
    }
}

impl From<SessionError> for AuthError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Corrupt(reason) => Self::SessionCorrupt(reason),
            SessionError::RoleMismatch { expected, actual } => {
                Self::RoleMismatch { expected, actual }
            }
            other => Self::Storage(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(status: StatusCode, message: &str) -> BackendError {
        BackendError::Status {
            status,
            message: message.to_string(),
        }
    }

    #[test]
    fn test_unauthorized_is_invalid_credentials() {
        assert_eq!(
            AuthError::from(status(StatusCode::UNAUTHORIZED, "Wrong password")),
            AuthError::InvalidCredentials("Wrong password".to_string())
        );
    }

    #[test]
    fn test_status_messages_map_to_account_errors() {
        assert_eq!(
            AuthError::from(status(
                StatusCode::FORBIDDEN,
                "Account pending verification by admin"
            )),
            AuthError::AccountPendingVerification
        );
        assert_eq!(
            AuthError::from(status(StatusCode::FORBIDDEN, "Your account is SUSPENDED")),
            AuthError::AccountSuspended
        );
    }

    #[test]
    fn test_other_status_keeps_code() {
        assert_eq!(
            AuthError::from(status(StatusCode::INTERNAL_SERVER_ERROR, "boom")),
            AuthError::Backend {
                status: 500,
                message: "boom".to_string()
            }
        );
    }

    #[test]
    fn test_network_error() {
        assert_eq!(
            AuthError::from(BackendError::Network("refused".to_string())),
            AuthError::NetworkFailure("refused".to_string())
        );
    }

    #[test]
    fn test_pending_message_is_specific() {
        let message = AuthError::AccountPendingVerification.to_string();
        assert!(message.contains("pending verification"));
        assert_ne!(message, AuthError::AccountSuspended.to_string());
    }

    #[test]
    fn test_session_errors() {
        assert_eq!(
            AuthError::from(SessionError::Corrupt("bad".to_string())),
            AuthError::SessionCorrupt("bad".to_string())
        );
        assert!(AuthError::SessionCorrupt("bad".to_string()).is_silent());
        assert!(!AuthError::AccountSuspended.is_silent());
    }

    #[test]
    fn test_log_returns_self() {
        let error = AuthError::OAuthMissingToken;
        assert_eq!(error.clone().log(), error);
    }
}
