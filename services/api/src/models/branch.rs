//! Branch models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A branch of study (department)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Branch {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// New branch payload
#[derive(Debug, Clone, Deserialize)]
pub struct NewBranch {
    pub name: String,
}

/// Branch update payload
#[derive(Debug, Clone, Deserialize, Default)]
pub struct UpdateBranch {
    pub name: Option<String>,
}

/// Query parameters for branch listing
#[derive(Debug, Clone, Deserialize)]
pub struct BranchQuery {
    /// Case-insensitive name search
    pub search: Option<String>,
}
