//! Study material repository for database operations

use anyhow::Result;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::models::material::{Material, MaterialQuery, NewMaterial, UpdateMaterial};

/// Material repository
#[derive(Clone)]
pub struct MaterialRepository {
    pool: PgPool,
}

fn material_from_row(row: PgRow) -> Material {
    Material {
        id: row.get("id"),
        title: row.get("title"),
        subject_id: row.get("subject_id"),
        semester: row.get("semester"),
        branch_id: row.get("branch_id"),
        material_type: row.get("material_type"),
        file: row.get("file"),
        uploaded_by: row.get("uploaded_by"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

impl MaterialRepository {
    /// Create a new material repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new material record
    pub async fn create(&self, payload: &NewMaterial) -> Result<Material> {
        let row = sqlx::query(
            r#"
            INSERT INTO materials (title, subject_id, semester, branch_id,
                                   material_type, file, uploaded_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, title, subject_id, semester, branch_id, material_type,
                      file, uploaded_by, created_at, updated_at
            "#,
        )
        .bind(&payload.title)
        .bind(payload.subject_id)
        .bind(payload.semester)
        .bind(payload.branch_id)
        .bind(&payload.material_type)
        .bind(&payload.file)
        .bind(payload.uploaded_by)
        .fetch_one(&self.pool)
        .await?;

        Ok(material_from_row(row))
    }

    /// List materials filtered by semester, branch, subject, and type
    pub async fn list(&self, query: &MaterialQuery) -> Result<Vec<Material>> {
        let rows = sqlx::query(
            r#"
            SELECT id, title, subject_id, semester, branch_id, material_type,
                   file, uploaded_by, created_at, updated_at
            FROM materials
            WHERE ($1::int2 IS NULL OR semester = $1)
              AND ($2::uuid IS NULL OR branch_id = $2)
              AND ($3::uuid IS NULL OR subject_id = $3)
              AND ($4::text IS NULL OR material_type = $4)
            ORDER BY created_at DESC
            "#,
        )
        .bind(query.semester)
        .bind(query.branch)
        .bind(query.subject)
        .bind(&query.material_type)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(material_from_row).collect())
    }

    /// Find a material by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Material>> {
        let row = sqlx::query(
            r#"
            SELECT id, title, subject_id, semester, branch_id, material_type,
                   file, uploaded_by, created_at, updated_at
            FROM materials
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(material_from_row))
    }

    /// Update a material's title or type
    pub async fn update(&self, id: Uuid, payload: &UpdateMaterial) -> Result<Option<Material>> {
        let row = sqlx::query(
            r#"
            UPDATE materials
            SET title = COALESCE($2, title),
                material_type = COALESCE($3, material_type),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, title, subject_id, semester, branch_id, material_type,
                      file, uploaded_by, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(&payload.title)
        .bind(&payload.material_type)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(material_from_row))
    }

    /// Delete a material
    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM materials WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
