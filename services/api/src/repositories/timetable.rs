//! Timetable repository for database operations

use anyhow::Result;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::models::timetable::{NewTimetable, Timetable, TimetableQuery};

/// Timetable repository
#[derive(Clone)]
pub struct TimetableRepository {
    pool: PgPool,
}

fn timetable_from_row(row: PgRow) -> Timetable {
    Timetable {
        id: row.get("id"),
        semester: row.get("semester"),
        branch_id: row.get("branch_id"),
        file: row.get("file"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

impl TimetableRepository {
    /// Create a new timetable repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new timetable entry
    pub async fn create(&self, payload: &NewTimetable) -> Result<Timetable> {
        let row = sqlx::query(
            r#"
            INSERT INTO timetables (semester, branch_id, file)
            VALUES ($1, $2, $3)
            RETURNING id, semester, branch_id, file, created_at, updated_at
            "#,
        )
        .bind(payload.semester)
        .bind(payload.branch_id)
        .bind(&payload.file)
        .fetch_one(&self.pool)
        .await?;

        Ok(timetable_from_row(row))
    }

    /// List timetables filtered by semester and branch
    pub async fn list(&self, query: &TimetableQuery) -> Result<Vec<Timetable>> {
        let rows = sqlx::query(
            r#"
            SELECT id, semester, branch_id, file, created_at, updated_at
            FROM timetables
            WHERE ($1::int2 IS NULL OR semester = $1)
              AND ($2::uuid IS NULL OR branch_id = $2)
            ORDER BY created_at DESC
            "#,
        )
        .bind(query.semester)
        .bind(query.branch)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(timetable_from_row).collect())
    }

    /// Find a timetable by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Timetable>> {
        let row = sqlx::query(
            r#"
            SELECT id, semester, branch_id, file, created_at, updated_at
            FROM timetables
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(timetable_from_row))
    }

    /// Delete a timetable
    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM timetables WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
