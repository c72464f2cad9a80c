//! Custom error types for the API service

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::{Envelope, INVALID_TOKEN_MESSAGE};
use thiserror::Error;

/// Custom error type for the API service
///
/// The three token failures are distinct variants so logs can tell them
/// apart, but they all render the identical 401 envelope: clients key their
/// forced-logout behavior on that exact shape.
#[derive(Error, Debug)]
pub enum ApiError {
    /// No Authorization header, or not a Bearer token
    #[error("Missing bearer token")]
    MissingToken,

    /// Token malformed, expired, or signature mismatch
    #[error("Invalid or expired token")]
    InvalidToken,

    /// Token verified but the principal no longer exists or is inactive
    #[error("Unknown principal")]
    UnknownPrincipal,

    /// Authenticated but not permitted; does not invalidate the session
    #[error("Forbidden")]
    Forbidden,

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request with message
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error
    #[error("Internal server error")]
    InternalServerError,

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] common::error::DatabaseError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::MissingToken | ApiError::InvalidToken | ApiError::UnknownPrincipal => {
                (StatusCode::UNAUTHORIZED, INVALID_TOKEN_MESSAGE.to_string())
            }
            ApiError::Forbidden => (
                StatusCode::FORBIDDEN,
                "You do not have permission to perform this action".to_string(),
            ),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::InternalServerError | ApiError::Database(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        let body = Json(Envelope::<serde_json::Value>::failure(message));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn envelope_of(err: ApiError) -> (StatusCode, Envelope<serde_json::Value>) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_token_failures_share_the_invalidation_envelope() {
        for err in [
            ApiError::MissingToken,
            ApiError::InvalidToken,
            ApiError::UnknownPrincipal,
        ] {
            let (status, envelope) = envelope_of(err).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED);
            assert!(envelope.invalidates_session());
        }
    }

    #[tokio::test]
    async fn test_forbidden_does_not_invalidate_session() {
        let (status, envelope) = envelope_of(ApiError::Forbidden).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert!(!envelope.success);
        assert!(!envelope.invalidates_session());
    }
}
