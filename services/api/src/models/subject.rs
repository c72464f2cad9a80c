//! Subject models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A subject taught in a given semester of a branch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subject {
    pub id: Uuid,
    pub name: String,
    pub code: String,
    pub semester: i16,
    pub branch_id: Uuid,
    pub credits: Option<i16>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// New subject payload
#[derive(Debug, Clone, Deserialize)]
pub struct NewSubject {
    pub name: String,
    pub code: String,
    pub semester: i16,
    pub branch_id: Uuid,
    pub credits: Option<i16>,
}

/// Subject update payload
#[derive(Debug, Clone, Deserialize, Default)]
pub struct UpdateSubject {
    pub name: Option<String>,
    pub code: Option<String>,
    pub credits: Option<i16>,
}

/// Query parameters for subject listing
#[derive(Debug, Clone, Deserialize)]
pub struct SubjectQuery {
    pub semester: Option<i16>,
    /// Branch ID
    pub branch: Option<Uuid>,
}
