//! JWT service for session token issuance and validation
//!
//! Tokens are stateless: a signed HS256 JWT carrying the principal id, the
//! principal kind, and an expiry. Nothing is persisted at issuance and there
//! is no revocation list; a token stays valid until its own expiry (logout is
//! a client-side concern).

use anyhow::Result;
use common::PrincipalKind;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// JWT configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Shared secret for signing and verifying tokens
    pub secret: String,
    /// Token expiration time in seconds (default: 24 hours)
    pub token_expiry: u64,
}

impl JwtConfig {
    /// Create a new JwtConfig from environment variables
    ///
    /// # Environment Variables
    /// - `JWT_SECRET`: Shared secret for signing tokens
    /// - `JWT_TOKEN_EXPIRY`: Token expiry in seconds (default: 86400)
    pub fn from_env() -> Result<Self> {
        let secret = std::env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET environment variable not set"))?;

        let token_expiry = std::env::var("JWT_TOKEN_EXPIRY")
            .unwrap_or_else(|_| "86400".to_string()) // 24 hours
            .parse()
            .unwrap_or(86400);

        Ok(JwtConfig {
            secret,
            token_expiry,
        })
    }
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Principal ID
    pub sub: Uuid,
    /// Principal kind (admin, faculty, student)
    pub kind: PrincipalKind,
    /// Issued at time
    pub iat: u64,
    /// Expiration time
    pub exp: u64,
}

/// Token issuance and validation
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    config: JwtConfig,
}

impl TokenService {
    /// Initialize a new token service
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());
        let mut validation = Validation::new(jsonwebtoken::Algorithm::HS256);
        validation.validate_exp = true;
        // Expiry is exact, no clock-skew allowance.
        validation.leeway = 0;

        TokenService {
            encoding_key,
            decoding_key,
            validation,
            config,
        }
    }

    /// Issue a token for a principal
    pub fn issue(&self, principal_id: Uuid, kind: PrincipalKind) -> Result<String> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| anyhow::anyhow!("Failed to get current time: {}", e))?
            .as_secs();

        self.issue_at(principal_id, kind, now)
    }

    /// Issue a token with an explicit issue time. Exposed for expiry testing.
    pub fn issue_at(&self, principal_id: Uuid, kind: PrincipalKind, now: u64) -> Result<String> {
        let claims = Claims {
            sub: principal_id,
            kind,
            iat: now,
            exp: now + self.config.token_expiry,
        };

        let token = encode(
            &Header::new(jsonwebtoken::Algorithm::HS256),
            &claims,
            &self.encoding_key,
        )?;
        Ok(token)
    }

    /// Validate a token and return the claims
    pub fn verify(&self, token: &str) -> Result<Claims> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)?;
        Ok(token_data.claims)
    }

    /// Get the token expiry time in seconds
    pub fn token_expiry(&self) -> u64 {
        self.config.token_expiry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new(JwtConfig {
            secret: "test-secret".to_string(),
            token_expiry: 3600,
        })
    }

    fn now() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs()
    }

    #[test]
    fn test_issue_and_verify_round_trip() {
        let svc = service();
        let id = Uuid::new_v4();

        let token = svc.issue(id, PrincipalKind::Student).unwrap();
        let claims = svc.verify(&token).unwrap();

        assert_eq!(claims.sub, id);
        assert_eq!(claims.kind, PrincipalKind::Student);
        assert_eq!(claims.exp, claims.iat + 3600);
    }

    #[test]
    fn test_expired_token_rejected_despite_valid_signature() {
        let svc = service();
        let id = Uuid::new_v4();

        // Issued long enough ago that the expiry has passed.
        let token = svc.issue_at(id, PrincipalKind::Admin, now() - 7200).unwrap();
        assert!(svc.verify(&token).is_err());
    }

    #[test]
    fn test_token_signed_with_other_secret_rejected() {
        let svc = service();
        let other = TokenService::new(JwtConfig {
            secret: "another-secret".to_string(),
            token_expiry: 3600,
        });

        let token = other.issue(Uuid::new_v4(), PrincipalKind::Faculty).unwrap();
        assert!(svc.verify(&token).is_err());
    }

    #[test]
    fn test_malformed_token_rejected() {
        let svc = service();
        assert!(svc.verify("not-a-token").is_err());
        assert!(svc.verify("").is_err());
    }

    #[test]
    fn test_tokens_issued_at_different_times_are_distinct_and_both_valid() {
        let svc = service();
        let id = Uuid::new_v4();
        let t = now();

        let first = svc.issue_at(id, PrincipalKind::Student, t - 10).unwrap();
        let second = svc.issue_at(id, PrincipalKind::Student, t).unwrap();

        assert_ne!(first, second);
        assert!(svc.verify(&first).is_ok());
        assert!(svc.verify(&second).is_ok());
    }
}
