//! Account models for admin, faculty, and student principals
//!
//! One table backs all three kinds; the optional columns only apply to some
//! kinds (enrollment number and semester for students, designation for staff).

use chrono::{DateTime, Utc};
use common::PrincipalKind;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A principal's account record, without the password hash
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    pub kind: PrincipalKind,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub gender: Option<String>,
    pub address: Option<String>,
    /// Stored profile photo filename under the media directory
    pub profile: Option<String>,
    /// Staff designation, admin and faculty only
    pub designation: Option<String>,
    /// Students only
    pub enrollment_no: Option<String>,
    /// Students only
    pub semester: Option<i16>,
    /// Students and faculty
    pub branch_id: Option<Uuid>,
    pub emergency_name: Option<String>,
    pub emergency_relationship: Option<String>,
    pub emergency_phone: Option<String>,
    pub status: String,
    pub password_changed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Registration payload, assembled from a multipart form
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub kind: PrincipalKind,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub gender: Option<String>,
    pub address: Option<String>,
    pub profile: Option<String>,
    pub designation: Option<String>,
    pub enrollment_no: Option<String>,
    pub semester: Option<i16>,
    pub branch_id: Option<Uuid>,
    pub emergency_name: Option<String>,
    pub emergency_relationship: Option<String>,
    pub emergency_phone: Option<String>,
    /// Argon2 hash of the kind's default password
    pub password_hash: String,
}

/// Account update payload, assembled from a multipart form
#[derive(Debug, Clone, Default)]
pub struct UpdateAccount {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub gender: Option<String>,
    pub address: Option<String>,
    pub profile: Option<String>,
    pub designation: Option<String>,
    pub semester: Option<i16>,
    pub branch_id: Option<Uuid>,
    pub emergency_name: Option<String>,
    pub emergency_relationship: Option<String>,
    pub emergency_phone: Option<String>,
}

/// Request for changing one's own password
#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// Query parameters for account listing (student search)
#[derive(Debug, Clone, Deserialize)]
pub struct AccountQuery {
    pub enrollment: Option<String>,
    /// Case-insensitive first/last name search
    pub name: Option<String>,
    pub semester: Option<i16>,
    /// Branch ID
    pub branch: Option<Uuid>,
}
