//! Notice models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A notice posted for students, faculty, or both
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notice {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub link: Option<String>,
    pub for_student: bool,
    pub for_faculty: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// New notice payload
#[derive(Debug, Clone, Deserialize)]
pub struct NewNotice {
    pub title: String,
    pub description: String,
    pub link: Option<String>,
    pub for_student: bool,
    pub for_faculty: bool,
}

/// Notice update payload
#[derive(Debug, Clone, Deserialize, Default)]
pub struct UpdateNotice {
    pub title: Option<String>,
    pub description: Option<String>,
    pub link: Option<String>,
    pub for_student: Option<bool>,
    pub for_faculty: Option<bool>,
}
