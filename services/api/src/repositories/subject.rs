//! Subject repository for database operations

use anyhow::Result;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::models::subject::{NewSubject, Subject, SubjectQuery, UpdateSubject};

/// Subject repository
#[derive(Clone)]
pub struct SubjectRepository {
    pool: PgPool,
}

fn subject_from_row(row: PgRow) -> Subject {
    Subject {
        id: row.get("id"),
        name: row.get("name"),
        code: row.get("code"),
        semester: row.get("semester"),
        branch_id: row.get("branch_id"),
        credits: row.get("credits"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

impl SubjectRepository {
    /// Create a new subject repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new subject
    pub async fn create(&self, payload: &NewSubject) -> Result<Subject> {
        let row = sqlx::query(
            r#"
            INSERT INTO subjects (name, code, semester, branch_id, credits)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, code, semester, branch_id, credits, created_at, updated_at
            "#,
        )
        .bind(&payload.name)
        .bind(&payload.code)
        .bind(payload.semester)
        .bind(payload.branch_id)
        .bind(payload.credits)
        .fetch_one(&self.pool)
        .await?;

        Ok(subject_from_row(row))
    }

    /// List subjects filtered by semester and branch
    pub async fn list(&self, query: &SubjectQuery) -> Result<Vec<Subject>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, code, semester, branch_id, credits, created_at, updated_at
            FROM subjects
            WHERE ($1::int2 IS NULL OR semester = $1)
              AND ($2::uuid IS NULL OR branch_id = $2)
            ORDER BY semester, name
            "#,
        )
        .bind(query.semester)
        .bind(query.branch)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(subject_from_row).collect())
    }

    /// Update a subject
    pub async fn update(&self, id: Uuid, payload: &UpdateSubject) -> Result<Option<Subject>> {
        let row = sqlx::query(
            r#"
            UPDATE subjects
            SET name = COALESCE($2, name),
                code = COALESCE($3, code),
                credits = COALESCE($4, credits),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, code, semester, branch_id, credits, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(&payload.name)
        .bind(&payload.code)
        .bind(payload.credits)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(subject_from_row))
    }

    /// Delete a subject
    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM subjects WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
