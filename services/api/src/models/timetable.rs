//! Timetable models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A timetable image for one semester of a branch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Timetable {
    pub id: Uuid,
    pub semester: i16,
    pub branch_id: Uuid,
    /// Stored filename under the media directory
    pub file: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// New timetable payload, assembled from a multipart form
#[derive(Debug, Clone)]
pub struct NewTimetable {
    pub semester: i16,
    pub branch_id: Uuid,
    pub file: String,
}

/// Query parameters for timetable listing
#[derive(Debug, Clone, Deserialize)]
pub struct TimetableQuery {
    pub semester: Option<i16>,
    /// Branch ID
    pub branch: Option<Uuid>,
}
