//! Credential store: principal lookup and password verification

use anyhow::Result;
use argon2::{Argon2, PasswordHash, PasswordVerifier};
use common::PrincipalKind;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::info;

use crate::models::Principal;

/// Principal repository
#[derive(Clone)]
pub struct PrincipalRepository {
    pool: PgPool,
}

/// Verify a password against a stored argon2 hash
pub fn verify_password(hash: &str, password: &str) -> Result<bool> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| anyhow::anyhow!("Failed to parse password hash: {}", e))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

fn principal_from_row(row: PgRow) -> Result<Principal> {
    Ok(Principal {
        id: row.get("id"),
        kind: row
            .get::<String, _>("kind")
            .parse()
            .map_err(|e| anyhow::anyhow!("{}", e))?,
        email: row.get("email"),
        enrollment_no: row.get("enrollment_no"),
        password_hash: row.get("password_hash"),
        password_changed: row.get("password_changed"),
        status: row
            .get::<String, _>("status")
            .parse()
            .map_err(|e| anyhow::anyhow!("{}", e))?,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

impl PrincipalRepository {
    /// Create a new principal repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a principal of the given kind by email or enrollment number
    pub async fn find_by_identifier(
        &self,
        kind: PrincipalKind,
        identifier: &str,
    ) -> Result<Option<Principal>> {
        info!("Finding {} by identifier", kind);

        let row = sqlx::query(
            r#"
            SELECT id, kind, email, enrollment_no, password_hash,
                   password_changed, status, created_at, updated_at
            FROM principals
            WHERE kind = $1 AND (email = $2 OR enrollment_no = $2)
            "#,
        )
        .bind(kind.as_str())
        .bind(identifier)
        .fetch_optional(&self.pool)
        .await?;

        row.map(principal_from_row).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PrincipalStatus;
    use argon2::password_hash::{PasswordHasher, SaltString};
    use chrono::Utc;
    use uuid::Uuid;

    fn principal_with_password(password: &str) -> Principal {
        let salt = SaltString::generate(&mut rand::thread_rng());
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .unwrap()
            .to_string();

        Principal {
            id: Uuid::new_v4(),
            kind: PrincipalKind::Student,
            email: "student@college.test".to_string(),
            enrollment_no: Some("20230042".to_string()),
            password_hash: hash,
            password_changed: false,
            status: PrincipalStatus::Active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_verify_password() {
        let principal = principal_with_password("student123");

        assert!(verify_password(&principal.password_hash, "student123").unwrap());
        assert!(!verify_password(&principal.password_hash, "student124").unwrap());
    }

    #[test]
    fn test_verify_password_rejects_garbage_hash() {
        assert!(verify_password("not-a-phc-string", "student123").is_err());
    }
}
