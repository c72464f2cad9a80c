//! Branch repository for database operations

use anyhow::Result;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::models::branch::{Branch, BranchQuery, NewBranch, UpdateBranch};

/// Branch repository
#[derive(Clone)]
pub struct BranchRepository {
    pool: PgPool,
}

fn branch_from_row(row: PgRow) -> Branch {
    Branch {
        id: row.get("id"),
        name: row.get("name"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

impl BranchRepository {
    /// Create a new branch repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new branch
    pub async fn create(&self, payload: &NewBranch) -> Result<Branch> {
        let row = sqlx::query(
            r#"
            INSERT INTO branches (name)
            VALUES ($1)
            RETURNING id, name, created_at, updated_at
            "#,
        )
        .bind(&payload.name)
        .fetch_one(&self.pool)
        .await?;

        Ok(branch_from_row(row))
    }

    /// List branches, optionally filtered by a name search
    pub async fn list(&self, query: &BranchQuery) -> Result<Vec<Branch>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, created_at, updated_at
            FROM branches
            WHERE ($1::text IS NULL OR name ILIKE '%' || $1 || '%')
            ORDER BY name
            "#,
        )
        .bind(&query.search)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(branch_from_row).collect())
    }

    /// Update a branch
    pub async fn update(&self, id: Uuid, payload: &UpdateBranch) -> Result<Option<Branch>> {
        let row = sqlx::query(
            r#"
            UPDATE branches
            SET name = COALESCE($2, name), updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(&payload.name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(branch_from_row))
    }

    /// Delete a branch
    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM branches WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
