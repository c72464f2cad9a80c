//! Study material models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Accepted material types
pub const MATERIAL_TYPES: [&str; 4] = ["notes", "assignment", "syllabus", "other"];

/// A study material file scoped to a subject, semester and branch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Material {
    pub id: Uuid,
    pub title: String,
    pub subject_id: Uuid,
    pub semester: i16,
    pub branch_id: Uuid,
    #[serde(rename = "type")]
    pub material_type: String,
    /// Stored filename under the media directory
    pub file: String,
    pub uploaded_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// New material payload, assembled from a multipart form
#[derive(Debug, Clone)]
pub struct NewMaterial {
    pub title: String,
    pub subject_id: Uuid,
    pub semester: i16,
    pub branch_id: Uuid,
    pub material_type: String,
    pub file: String,
    pub uploaded_by: Uuid,
}

/// Material update payload
#[derive(Debug, Clone, Deserialize, Default)]
pub struct UpdateMaterial {
    pub title: Option<String>,
    #[serde(rename = "type")]
    pub material_type: Option<String>,
}

/// Query parameters for material listing
#[derive(Debug, Clone, Deserialize)]
pub struct MaterialQuery {
    pub semester: Option<i16>,
    /// Branch ID
    pub branch: Option<Uuid>,
    /// Subject ID
    pub subject: Option<Uuid>,
    /// Filter by material type
    #[serde(rename = "type")]
    pub material_type: Option<String>,
}
