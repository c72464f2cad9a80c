//! Account repository: principal records across all three kinds
//!
//! Also the write side of the credential store (registration hashes, password
//! changes) and the guard's principal-liveness lookup.

use anyhow::Result;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use common::PrincipalKind;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::middleware::AuthPrincipal;
use crate::models::account::{Account, AccountQuery, NewAccount, UpdateAccount};

const ACCOUNT_COLUMNS: &str = "id, kind, first_name, last_name, email, phone, gender, address, \
     profile, designation, enrollment_no, semester, branch_id, emergency_name, \
     emergency_relationship, emergency_phone, status, password_changed, created_at, updated_at";

/// Hash a password with argon2 and a fresh salt
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut rand::thread_rng());
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?
        .to_string();
    Ok(hash)
}

/// Verify a password against a stored argon2 hash
pub fn verify_password(hash: &str, password: &str) -> Result<bool> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| anyhow::anyhow!("Failed to parse password hash: {}", e))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

fn account_from_row(row: PgRow) -> Result<Account> {
    Ok(Account {
        id: row.get("id"),
        kind: row
            .get::<String, _>("kind")
            .parse()
            .map_err(|e| anyhow::anyhow!("{}", e))?,
        first_name: row.get("first_name"),
        last_name: row.get("last_name"),
        email: row.get("email"),
        phone: row.get("phone"),
        gender: row.get("gender"),
        address: row.get("address"),
        profile: row.get("profile"),
        designation: row.get("designation"),
        enrollment_no: row.get("enrollment_no"),
        semester: row.get("semester"),
        branch_id: row.get("branch_id"),
        emergency_name: row.get("emergency_name"),
        emergency_relationship: row.get("emergency_relationship"),
        emergency_phone: row.get("emergency_phone"),
        status: row.get("status"),
        password_changed: row.get("password_changed"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

/// Account repository
#[derive(Clone)]
pub struct AccountRepository {
    pool: PgPool,
}

impl AccountRepository {
    /// Create a new account repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Register a new account
    pub async fn create(&self, payload: &NewAccount) -> Result<Account> {
        let sql = format!(
            r#"
            INSERT INTO principals (kind, first_name, last_name, email, phone, gender,
                                    address, profile, designation, enrollment_no, semester,
                                    branch_id, emergency_name, emergency_relationship,
                                    emergency_phone, password_hash)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            RETURNING {ACCOUNT_COLUMNS}
            "#
        );
        let row = sqlx::query(&sql)
            .bind(payload.kind.as_str())
            .bind(&payload.first_name)
            .bind(&payload.last_name)
            .bind(&payload.email)
            .bind(&payload.phone)
            .bind(&payload.gender)
            .bind(&payload.address)
            .bind(&payload.profile)
            .bind(&payload.designation)
            .bind(&payload.enrollment_no)
            .bind(payload.semester)
            .bind(payload.branch_id)
            .bind(&payload.emergency_name)
            .bind(&payload.emergency_relationship)
            .bind(&payload.emergency_phone)
            .bind(&payload.password_hash)
            .fetch_one(&self.pool)
            .await?;

        account_from_row(row)
    }

    /// Whether an account of this kind already uses the email
    pub async fn email_taken(&self, kind: PrincipalKind, email: &str) -> Result<bool> {
        let row = sqlx::query("SELECT 1 AS x FROM principals WHERE kind = $1 AND email = $2")
            .bind(kind.as_str())
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.is_some())
    }

    /// List active accounts of a kind, with optional student search filters
    pub async fn list(&self, kind: PrincipalKind, query: &AccountQuery) -> Result<Vec<Account>> {
        let sql = format!(
            r#"
            SELECT {ACCOUNT_COLUMNS}
            FROM principals
            WHERE kind = $1 AND status = 'active'
              AND ($2::text IS NULL OR enrollment_no = $2)
              AND ($3::text IS NULL
                   OR first_name ILIKE '%' || $3 || '%'
                   OR last_name ILIKE '%' || $3 || '%')
              AND ($4::int2 IS NULL OR semester = $4)
              AND ($5::uuid IS NULL OR branch_id = $5)
            ORDER BY created_at DESC
            "#
        );
        let rows = sqlx::query(&sql)
            .bind(kind.as_str())
            .bind(&query.enrollment)
            .bind(&query.name)
            .bind(query.semester)
            .bind(query.branch)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(account_from_row).collect()
    }

    /// Find an account by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>> {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM principals WHERE id = $1");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(account_from_row).transpose()
    }

    /// Resolve the lightweight principal the access guard attaches to
    /// requests. Returns None when the principal is gone or inactive.
    pub async fn find_auth_principal(&self, id: Uuid) -> Result<Option<AuthPrincipal>> {
        let row = sqlx::query(
            r#"
            SELECT id, kind, semester, branch_id
            FROM principals
            WHERE id = $1 AND status = 'active'
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(AuthPrincipal {
                id: row.get("id"),
                kind: row
                    .get::<String, _>("kind")
                    .parse()
                    .map_err(|e| anyhow::anyhow!("{}", e))?,
                semester: row.get("semester"),
                branch_id: row.get("branch_id"),
            })),
            None => Ok(None),
        }
    }

    /// Update an account's profile fields
    pub async fn update(
        &self,
        id: Uuid,
        kind: PrincipalKind,
        payload: &UpdateAccount,
    ) -> Result<Option<Account>> {
        let sql = format!(
            r#"
            UPDATE principals
            SET first_name = COALESCE($3, first_name),
                last_name = COALESCE($4, last_name),
                email = COALESCE($5, email),
                phone = COALESCE($6, phone),
                gender = COALESCE($7, gender),
                address = COALESCE($8, address),
                profile = COALESCE($9, profile),
                designation = COALESCE($10, designation),
                semester = COALESCE($11, semester),
                branch_id = COALESCE($12, branch_id),
                emergency_name = COALESCE($13, emergency_name),
                emergency_relationship = COALESCE($14, emergency_relationship),
                emergency_phone = COALESCE($15, emergency_phone),
                updated_at = NOW()
            WHERE id = $1 AND kind = $2
            RETURNING {ACCOUNT_COLUMNS}
            "#
        );
        let row = sqlx::query(&sql)
            .bind(id)
            .bind(kind.as_str())
            .bind(&payload.first_name)
            .bind(&payload.last_name)
            .bind(&payload.email)
            .bind(&payload.phone)
            .bind(&payload.gender)
            .bind(&payload.address)
            .bind(&payload.profile)
            .bind(&payload.designation)
            .bind(payload.semester)
            .bind(payload.branch_id)
            .bind(&payload.emergency_name)
            .bind(&payload.emergency_relationship)
            .bind(&payload.emergency_phone)
            .fetch_optional(&self.pool)
            .await?;

        row.map(account_from_row).transpose()
    }

    /// Soft-delete an account by flipping its status to inactive
    pub async fn deactivate(&self, id: Uuid, kind: PrincipalKind) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE principals
            SET status = 'inactive', updated_at = NOW()
            WHERE id = $1 AND kind = $2 AND status = 'active'
            "#,
        )
        .bind(id)
        .bind(kind.as_str())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Fetch the stored password hash for a principal
    pub async fn password_hash(&self, id: Uuid) -> Result<Option<String>> {
        let row = sqlx::query("SELECT password_hash FROM principals WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|r| r.get("password_hash")))
    }

    /// Store a new password hash and mark the default password as replaced
    pub async fn set_password(&self, id: Uuid, password_hash: &str) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE principals
            SET password_hash = $2, password_changed = TRUE, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(password_hash)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify_password() {
        let hash = hash_password("admin123").unwrap();
        assert!(verify_password(&hash, "admin123").unwrap());
        assert!(!verify_password(&hash, "admin124").unwrap());
    }

    #[test]
    fn test_hashes_are_salted() {
        let first = hash_password("student123").unwrap();
        let second = hash_password("student123").unwrap();
        assert_ne!(first, second);
    }
}
