//! Authentication service routes

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use common::{Envelope, PrincipalKind};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::{AppState, repositories, validation};

/// Request for login
#[derive(Deserialize)]
pub struct LoginRequest {
    pub kind: PrincipalKind,
    /// Email, or enrollment number for students
    pub identifier: String,
    pub password: String,
}

/// Response for a successful login
#[derive(Serialize)]
pub struct TokenResponse {
    pub token: String,
    pub token_type: String,
    pub expires_in: u64,
    /// True while the principal still uses the initial password assigned at
    /// registration.
    pub default_password: bool,
}

/// Create the router for the authentication service
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/auth/login", post(login))
        .with_state(state)
}

/// Health check endpoint; also reports database reachability
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let database_ok = matches!(
        common::database::health_check(&state.db_pool).await,
        Ok(true)
    );

    Json(serde_json::json!({
        "status": if database_ok { "ok" } else { "degraded" },
        "service": "auth-service"
    }))
}

/// Login endpoint
///
/// Unknown identity and wrong password produce the identical error shape so
/// the response reveals nothing about which identities exist.
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AuthError> {
    info!("Login attempt for {}", payload.kind);

    let identifier = payload.identifier.trim();
    // Students may log in with their enrollment number instead of an email.
    let identifier_ok = match payload.kind {
        PrincipalKind::Student => validation::validate_email(identifier).is_ok()
            || validation::validate_enrollment(identifier).is_ok(),
        _ => validation::validate_email(identifier).is_ok(),
    };
    if !identifier_ok {
        return Err(AuthError::BadRequest(
            "Identifier must be a valid email or enrollment number".to_string(),
        ));
    }
    validation::validate_password(&payload.password).map_err(AuthError::BadRequest)?;

    let lockout_key = format!("{}:{}", payload.kind, identifier);
    if state.lockout.is_locked(&lockout_key).await {
        warn!("Login refused, identity is locked out: {}", payload.kind);
        return Err(AuthError::Locked);
    }

    let principal = state
        .principals
        .find_by_identifier(payload.kind, identifier)
        .await
        .map_err(|e| {
            error!("Failed to look up principal: {}", e);
            AuthError::InternalServerError
        })?;

    let Some(principal) = principal else {
        state.lockout.record_failure(&lockout_key).await;
        return Err(AuthError::InvalidCredentials);
    };

    let password_ok =
        repositories::principal::verify_password(&principal.password_hash, &payload.password)
            .map_err(|e| {
                error!("Failed to verify password: {}", e);
                AuthError::InternalServerError
            })?;

    if !password_ok {
        state.lockout.record_failure(&lockout_key).await;
        return Err(AuthError::InvalidCredentials);
    }

    if !principal.is_active() {
        // Same outward shape as a bad password; the account state is not
        // disclosed to the caller.
        warn!("Login attempt for inactive principal {}", principal.id);
        state.lockout.record_failure(&lockout_key).await;
        return Err(AuthError::InvalidCredentials);
    }

    state.lockout.clear(&lockout_key).await;

    let token = state
        .token_service
        .issue(principal.id, principal.kind)
        .map_err(|e| {
            error!("Failed to issue token: {}", e);
            AuthError::InternalServerError
        })?;

    let response = TokenResponse {
        token,
        token_type: "Bearer".to_string(),
        expires_in: state.token_service.token_expiry(),
        default_password: !principal.password_changed,
    };

    Ok((
        StatusCode::OK,
        Json(Envelope::ok("Login successful", response)),
    ))
}

/// Custom error type for authentication errors
#[derive(Debug, Error)]
pub enum AuthError {
    /// Bad credentials: unknown identity, wrong password, or inactive account
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Too many failed attempts for this identity
    #[error("Too many failed login attempts, please try again later")]
    Locked,

    /// Malformed request payload
    #[error("{0}")]
    BadRequest(String),

    #[error("Internal server error")]
    InternalServerError,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = match &self {
            AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AuthError::Locked => StatusCode::TOO_MANY_REQUESTS,
            AuthError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AuthError::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(Envelope::<serde_json::Value>::failure(self.to_string()));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::INVALID_TOKEN_MESSAGE;

    #[test]
    fn test_auth_errors_never_use_the_invalidation_message() {
        // Login failures must not trip the client's forced-logout trigger.
        for err in [
            AuthError::InvalidCredentials,
            AuthError::Locked,
            AuthError::BadRequest("Identifier is required".to_string()),
            AuthError::InternalServerError,
        ] {
            assert_ne!(err.to_string(), INVALID_TOKEN_MESSAGE);
        }
    }

    #[test]
    fn test_credential_failures_share_one_message() {
        assert_eq!(AuthError::InvalidCredentials.to_string(), "Invalid credentials");
    }
}
