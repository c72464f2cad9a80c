//! Principal model as seen by the credential store

use chrono::{DateTime, Utc};
use common::PrincipalKind;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// Account status. Principals are never hard-deleted in the normal flow;
/// removal flips the status to inactive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrincipalStatus {
    Active,
    Inactive,
}

impl FromStr for PrincipalStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(PrincipalStatus::Active),
            "inactive" => Ok(PrincipalStatus::Inactive),
            other => Err(format!("Unknown principal status: {}", other)),
        }
    }
}

/// Principal entity, restricted to the fields login needs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Principal {
    pub id: Uuid,
    pub kind: PrincipalKind,
    pub email: String,
    pub enrollment_no: Option<String>,
    pub password_hash: String,
    pub password_changed: bool,
    pub status: PrincipalStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Principal {
    pub fn is_active(&self) -> bool {
        self.status == PrincipalStatus::Active
    }
}
