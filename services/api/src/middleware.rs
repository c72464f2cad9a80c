//! Access guard: bearer-token validation and principal resolution
//!
//! Every protected route passes through here. A request fails terminally if
//! the token is absent, fails verification, or references a principal that no
//! longer exists or is inactive. On success the resolved principal is placed
//! in the request extensions for the authorization rules downstream.

use axum::{
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use common::PrincipalKind;
use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::Deserialize;
use tracing::warn;
use uuid::Uuid;

use crate::{error::ApiError, state::AppState};

/// JWT claims structure
#[derive(Debug, Deserialize)]
pub struct Claims {
    /// Principal ID
    pub sub: Uuid,
    /// Principal kind
    pub kind: PrincipalKind,
    /// Issued at time
    pub iat: u64,
    /// Expiration time
    pub exp: u64,
}

/// The authenticated principal attached to a request
#[derive(Debug, Clone)]
pub struct AuthPrincipal {
    pub id: Uuid,
    pub kind: PrincipalKind,
    /// Current semester, students only
    pub semester: Option<i16>,
    /// Home branch, students and faculty
    pub branch_id: Option<Uuid>,
}

/// Token verifier, built once at startup and shared through the state
#[derive(Clone)]
pub struct TokenVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    /// Build a verifier from the shared secret
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(jsonwebtoken::Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;

        TokenVerifier {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Build a verifier from the `JWT_SECRET` environment variable
    pub fn from_env() -> anyhow::Result<Self> {
        let secret = std::env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET environment variable not set"))?;
        Ok(Self::new(&secret))
    }

    /// Verify signature and expiry, returning the claims
    pub fn verify(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)?;
        Ok(token_data.claims)
    }
}

/// Decide whether verified claims still describe a live principal. The token
/// alone is not enough: the principal must exist and be active at the time of
/// the request, and its stored kind must match the one baked into the token.
fn authorize_claims(
    claims: &Claims,
    principal: Option<AuthPrincipal>,
) -> Result<AuthPrincipal, ApiError> {
    let principal = principal.ok_or_else(|| {
        warn!("Token references missing or inactive principal {}", claims.sub);
        ApiError::UnknownPrincipal
    })?;

    // A kind mismatch means the token no longer describes the stored record.
    if principal.kind != claims.kind {
        warn!("Token kind does not match principal {}", claims.sub);
        return Err(ApiError::UnknownPrincipal);
    }

    Ok(principal)
}

/// Access guard middleware
pub async fn access_guard(
    State(state): State<AppState>,
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, ApiError> {
    // Extract the Authorization header
    let auth_header = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .ok_or(ApiError::MissingToken)?;

    // Check if it's a Bearer token
    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(ApiError::MissingToken)?;

    // Verify signature and expiry
    let claims = state.verifier.verify(token).map_err(|e| {
        warn!("Token verification failed: {}", e);
        ApiError::InvalidToken
    })?;

    let live = state
        .accounts
        .find_auth_principal(claims.sub)
        .await
        .map_err(|e| {
            tracing::error!("Failed to resolve principal: {}", e);
            ApiError::InternalServerError
        })?;
    let principal = authorize_claims(&claims, live)?;

    // Insert the principal into the request extensions
    req.extensions_mut().insert(principal);

    // Call the next service
    let response = next.run(req).await;

    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{EncodingKey, Header, encode};
    use serde::Serialize;

    #[derive(Serialize)]
    struct TestClaims {
        sub: Uuid,
        kind: PrincipalKind,
        iat: u64,
        exp: u64,
    }

    fn sign(claims: &TestClaims, secret: &str) -> String {
        encode(
            &Header::new(jsonwebtoken::Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn now() -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_secs()
    }

    #[test]
    fn test_verifier_accepts_valid_token() {
        let verifier = TokenVerifier::new("test-secret");
        let id = Uuid::new_v4();
        let token = sign(
            &TestClaims {
                sub: id,
                kind: PrincipalKind::Faculty,
                iat: now(),
                exp: now() + 3600,
            },
            "test-secret",
        );

        let claims = verifier.verify(&token).unwrap();
        assert_eq!(claims.sub, id);
        assert_eq!(claims.kind, PrincipalKind::Faculty);
    }

    #[test]
    fn test_verifier_rejects_expired_token_with_valid_signature() {
        let verifier = TokenVerifier::new("test-secret");
        let token = sign(
            &TestClaims {
                sub: Uuid::new_v4(),
                kind: PrincipalKind::Student,
                iat: now() - 7200,
                exp: now() - 3600,
            },
            "test-secret",
        );

        assert!(verifier.verify(&token).is_err());
    }

    fn claims_for(id: Uuid, kind: PrincipalKind) -> Claims {
        Claims {
            sub: id,
            kind,
            iat: now(),
            exp: now() + 3600,
        }
    }

    #[test]
    fn test_guard_rejects_missing_or_inactive_principal() {
        // The lookup only returns active principals, so a deactivated or
        // deleted account surfaces here as None.
        let claims = claims_for(Uuid::new_v4(), PrincipalKind::Student);

        assert!(matches!(
            authorize_claims(&claims, None),
            Err(ApiError::UnknownPrincipal)
        ));
    }

    #[test]
    fn test_guard_rejects_kind_mismatch() {
        let id = Uuid::new_v4();
        let claims = claims_for(id, PrincipalKind::Student);
        let stored = AuthPrincipal {
            id,
            kind: PrincipalKind::Faculty,
            semester: None,
            branch_id: Some(Uuid::new_v4()),
        };

        assert!(matches!(
            authorize_claims(&claims, Some(stored)),
            Err(ApiError::UnknownPrincipal)
        ));
    }

    #[test]
    fn test_guard_accepts_live_matching_principal() {
        let id = Uuid::new_v4();
        let claims = claims_for(id, PrincipalKind::Student);
        let stored = AuthPrincipal {
            id,
            kind: PrincipalKind::Student,
            semester: Some(3),
            branch_id: Some(Uuid::new_v4()),
        };

        let principal = authorize_claims(&claims, Some(stored)).unwrap();
        assert_eq!(principal.id, id);
        assert_eq!(principal.kind, PrincipalKind::Student);
    }

    #[test]
    fn test_verifier_rejects_tampered_token() {
        let verifier = TokenVerifier::new("test-secret");
        let token = sign(
            &TestClaims {
                sub: Uuid::new_v4(),
                kind: PrincipalKind::Admin,
                iat: now(),
                exp: now() + 3600,
            },
            "wrong-secret",
        );

        assert!(verifier.verify(&token).is_err());
    }
}
