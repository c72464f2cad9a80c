//! Notice repository for database operations

use anyhow::Result;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::models::notice::{NewNotice, Notice, UpdateNotice};

/// Notice repository
#[derive(Clone)]
pub struct NoticeRepository {
    pool: PgPool,
}

fn notice_from_row(row: PgRow) -> Notice {
    Notice {
        id: row.get("id"),
        title: row.get("title"),
        description: row.get("description"),
        link: row.get("link"),
        for_student: row.get("for_student"),
        for_faculty: row.get("for_faculty"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

impl NoticeRepository {
    /// Create a new notice repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new notice
    pub async fn create(&self, payload: &NewNotice) -> Result<Notice> {
        let row = sqlx::query(
            r#"
            INSERT INTO notices (title, description, link, for_student, for_faculty)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, title, description, link, for_student, for_faculty,
                      created_at, updated_at
            "#,
        )
        .bind(&payload.title)
        .bind(&payload.description)
        .bind(&payload.link)
        .bind(payload.for_student)
        .bind(payload.for_faculty)
        .fetch_one(&self.pool)
        .await?;

        Ok(notice_from_row(row))
    }

    /// List all notices, newest first
    pub async fn list(&self) -> Result<Vec<Notice>> {
        let rows = sqlx::query(
            r#"
            SELECT id, title, description, link, for_student, for_faculty,
                   created_at, updated_at
            FROM notices
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(notice_from_row).collect())
    }

    /// Update a notice
    pub async fn update(&self, id: Uuid, payload: &UpdateNotice) -> Result<Option<Notice>> {
        let row = sqlx::query(
            r#"
            UPDATE notices
            SET title = COALESCE($2, title),
                description = COALESCE($3, description),
                link = COALESCE($4, link),
                for_student = COALESCE($5, for_student),
                for_faculty = COALESCE($6, for_faculty),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, title, description, link, for_student, for_faculty,
                      created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(&payload.title)
        .bind(&payload.description)
        .bind(&payload.link)
        .bind(payload.for_student)
        .bind(payload.for_faculty)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(notice_from_row))
    }

    /// Delete a notice
    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM notices WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
