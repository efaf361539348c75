use async_trait::async_trait;
use serde_json::Value;
use url::Url;

use crate::config::{PORTAL_API_BASE_URL, PORTAL_HTTP_TIMEOUT, PORTAL_OAUTH_REDIRECT_URI};
use crate::principal::Role;

use super::envelope::{error_message, split_envelope};
use super::errors::BackendError;
use super::types::{AuthBackend, BackendSession, Credentials, Registration};

/// [`AuthBackend`] speaking to the portal REST API.
///
/// Role routes live under `{base}/{namespace}/auth/`; the OAuth session
/// exchange is shared by all roles at `{base}/auth/oauth/session`.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
    redirect_uri: String,
}

impl HttpBackend {
    pub fn new(base_url: &str) -> Result<Self, BackendError> {
        Url::parse(base_url)
            .map_err(|e| BackendError::Network(format!("Invalid base URL {base_url}: {e}")))?;

        let client = reqwest::Client::builder()
            .timeout(*PORTAL_HTTP_TIMEOUT)
            .build()
            .map_err(|e| BackendError::Network(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            redirect_uri: PORTAL_OAUTH_REDIRECT_URI.to_string(),
        })
    }

    pub fn from_env() -> Result<Self, BackendError> {
        Self::new(PORTAL_API_BASE_URL.as_str())
    }

    pub fn with_redirect_uri(mut self, redirect_uri: impl Into<String>) -> Self {
        self.redirect_uri = redirect_uri.into();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn role_url(&self, role: Role, path: &str) -> String {
        format!(
            "{}/{}/auth/{}",
            self.base_url,
            role.namespace().as_str(),
            path
        )
    }

    async fn execute(&self, request: reqwest::RequestBuilder) -> Result<Value, BackendError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let fallback = status
                .canonical_reason()
                .map(str::to_string)
                .unwrap_or_else(|| status.to_string());
            let message = error_message(&body, &fallback);
            tracing::debug!("Backend responded {}: {}", status, message);
            return Err(BackendError::Status { status, message });
        }

        if body.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&body)
            .map_err(|e| BackendError::InvalidResponse(format!("Failed to parse body: {e}")))
    }
}

#[async_trait]
impl AuthBackend for HttpBackend {
    async fn login(
        &self,
        role: Role,
        credentials: &Credentials,
    ) -> Result<BackendSession, BackendError> {
        tracing::debug!("Logging in {} {}", role, credentials.email);
        let body = self
            .execute(
                self.client
                    .post(self.role_url(role, "login"))
                    .json(credentials),
            )
            .await?;
        Ok(split_envelope(&body))
    }

    async fn register(
        &self,
        role: Role,
        registration: &Registration,
    ) -> Result<Option<BackendSession>, BackendError> {
        tracing::debug!("Registering {} {}", role, registration.email);
        let body = self
            .execute(
                self.client
                    .post(self.role_url(role, "register"))
                    .json(registration),
            )
            .await?;
        let session = split_envelope(&body);
        Ok((!session.is_empty()).then_some(session))
    }

    async fn logout(&self, role: Role, access_token: &str) -> Result<(), BackendError> {
        self.execute(
            self.client
                .post(self.role_url(role, "logout"))
                .bearer_auth(access_token),
        )
        .await?;
        Ok(())
    }

    async fn get_profile(&self, role: Role, access_token: &str) -> Result<Value, BackendError> {
        let body = self
            .execute(
                self.client
                    .get(self.role_url(role, "me"))
                    .bearer_auth(access_token),
            )
            .await?;
        split_envelope(&body).principal.ok_or_else(|| {
            BackendError::InvalidResponse("No principal in profile response".to_string())
        })
    }

    async fn refresh(
        &self,
        role: Role,
        access_token: &str,
    ) -> Result<BackendSession, BackendError> {
        let body = self
            .execute(
                self.client
                    .post(self.role_url(role, "refresh"))
                    .bearer_auth(access_token),
            )
            .await?;
        Ok(split_envelope(&body))
    }

    async fn oauth_authorize_url(&self, role: Role) -> Result<String, BackendError> {
        let url = format!(
            "{}?redirect_uri={}",
            self.role_url(role, "oauth/url"),
            urlencoding::encode(&self.redirect_uri)
        );
        let body = self.execute(self.client.get(url)).await?;

        let authorize_url = match &body {
            Value::String(url) => Some(url.clone()),
            Value::Object(map) => ["url", "authorizeUrl", "authorize_url", "authUrl"]
                .iter()
                .filter_map(|key| map.get(*key))
                .find_map(Value::as_str)
                .map(str::to_string),
            _ => None,
        };

        authorize_url.ok_or_else(|| {
            BackendError::InvalidResponse("No authorize URL in response".to_string())
        })
    }

    async fn oauth_complete(&self, access_token: &str) -> Result<Value, BackendError> {
        let body = self
            .execute(
                self.client
                    .get(format!("{}/auth/oauth/session", self.base_url))
                    .bearer_auth(access_token),
            )
            .await?;
        split_envelope(&body).principal.ok_or_else(|| {
            BackendError::InvalidResponse("No principal in OAuth session response".to_string())
        })
    }
}
