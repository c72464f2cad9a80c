//! HTTP client for the auth and API services
//!
//! Wraps [`reqwest`] with the session handling the services expect: the
//! cached token rides along as a bearer header, and the one failure shape
//! that marks a dead session (`success=false`, the invalid-token message,
//! `data=null`) clears the cache and surfaces as [`ClientError::SessionExpired`]
//! so callers can route back to the login surface. A plain 403 does not
//! touch the session; the caller simply lacked permission.

pub mod session;

use std::sync::Arc;

use common::{Envelope, PrincipalKind};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub use session::{MemorySessionStore, SessionStore};

/// Errors surfaced to client callers
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The server rejected the session token; the cache has been cleared and
    /// the user must log in again.
    #[error("session expired, log in again")]
    SessionExpired,
    /// The server answered with a failure envelope.
    #[error("{message}")]
    Api { status: u16, message: String },
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Login request body for the auth service
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub kind: PrincipalKind,
    pub identifier: String,
    pub password: String,
}

/// Token payload returned by a successful login
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub token_type: String,
    pub expires_in: u64,
    /// True when the account still uses its kind's default password and
    /// should be nudged to change it.
    pub default_password: bool,
}

/// Client for the auth and API services
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    store: Arc<dyn SessionStore>,
}

impl ApiClient {
    /// Create a client against a base URL with the given session store
    pub fn new(base_url: impl Into<String>, store: Arc<dyn SessionStore>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            store,
        }
    }

    /// Whether a session token is currently cached
    pub fn has_session(&self) -> bool {
        self.store.load().is_some()
    }

    /// Log in and cache the returned token
    pub async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, ClientError> {
        let response = self
            .http
            .post(format!("{}/auth/login", self.base_url))
            .json(request)
            .send()
            .await?;

        let status = response.status().as_u16();
        let envelope: Envelope<LoginResponse> =
            serde_json::from_slice(&response.bytes().await?)?;

        let login = self.unwrap_envelope(status, envelope)?;
        self.store.save(&login.token);
        Ok(login)
    }

    /// Drop the cached session without calling the server; tokens are
    /// stateless so logout is purely local.
    pub fn logout(&self) {
        self.store.clear();
    }

    /// GET an API resource
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let request = self.http.get(self.url(path));
        self.send(request).await
    }

    /// POST a JSON body to an API resource
    pub async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let request = self.http.post(self.url(path)).json(body);
        self.send(request).await
    }

    /// PATCH a JSON body to an API resource
    pub async fn patch<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let request = self.http.patch(self.url(path)).json(body);
        self.send(request).await
    }

    /// DELETE an API resource
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let request = self.http.delete(self.url(path));
        self.send(request).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Attach the cached token (if any), send, and interpret the envelope.
    /// The token is never inspected locally; expiry is the server's call.
    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ClientError> {
        let request = match self.store.load() {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let response = request.send().await?;
        let status = response.status().as_u16();
        let envelope: Envelope<T> = serde_json::from_slice(&response.bytes().await?)?;

        self.unwrap_envelope(status, envelope)
    }

    /// Turn an envelope into its payload, clearing the session cache when
    /// the server says the token is no longer good.
    fn unwrap_envelope<T>(&self, status: u16, envelope: Envelope<T>) -> Result<T, ClientError> {
        if envelope.invalidates_session() {
            debug!("Server rejected the session token, clearing the cache");
            self.store.clear();
            return Err(ClientError::SessionExpired);
        }

        match envelope.data {
            Some(data) if envelope.success => Ok(data),
            _ => Err(ClientError::Api {
                status,
                message: envelope.message,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::INVALID_TOKEN_MESSAGE;

    fn client_with_token(token: &str) -> ApiClient {
        let store = Arc::new(MemorySessionStore::new());
        store.save(token);
        ApiClient::new("http://localhost:4000", store)
    }

    #[test]
    fn test_invalid_token_envelope_clears_session() {
        let client = client_with_token("stale");
        assert!(client.has_session());

        let envelope: Envelope<serde_json::Value> = Envelope::failure(INVALID_TOKEN_MESSAGE);
        let result = client.unwrap_envelope(401, envelope);

        assert!(matches!(result, Err(ClientError::SessionExpired)));
        assert!(!client.has_session());
    }

    #[test]
    fn test_forbidden_keeps_session() {
        let client = client_with_token("still-good");

        let envelope: Envelope<serde_json::Value> =
            Envelope::failure("You do not have permission to perform this action");
        let result = client.unwrap_envelope(403, envelope);

        match result {
            Err(ClientError::Api { status, message }) => {
                assert_eq!(status, 403);
                assert_eq!(message, "You do not have permission to perform this action");
            }
            other => panic!("expected Api error, got {:?}", other.map(|_| ())),
        }
        assert!(client.has_session());
    }

    #[test]
    fn test_success_envelope_yields_payload() {
        let client = client_with_token("good");
        let envelope = Envelope::ok("Fetched", serde_json::json!({"id": 1}));
        let value = client.unwrap_envelope(200, envelope).unwrap();
        assert_eq!(value["id"], 1);

        // Success leaves the cache alone.
        assert!(client.has_session());
    }

    #[test]
    fn test_logout_is_local() {
        let client = client_with_token("good");
        client.logout();
        assert!(!client.has_session());
    }
}
