//! Account routes for admin, faculty, and student principals
//!
//! One router serves all three kinds; the kind is baked in when the router is
//! mounted (`/api/admin`, `/api/faculty`, `/api/student`). Registration and
//! profile edits arrive as multipart forms because they may carry a profile
//! photo, with nested fields in bracket notation (`emergencyContact[name]`).

use axum::{
    Extension, Json, Router,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch, post},
};
use common::{Envelope, PrincipalKind};
use tracing::error;
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::AuthPrincipal;
use crate::models::account::{
    Account, AccountQuery, ChangePasswordRequest, NewAccount, UpdateAccount,
};
use crate::policy::{Action, ResourceKind, ResourceScope, is_allowed};
use crate::repositories::account::{hash_password, verify_password};
use crate::state::AppState;
use crate::upload::{self, UploadForm};

pub fn router(kind: PrincipalKind) -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/", get(list))
        .route("/my-details", get(my_details))
        .route("/change-password", post(change_password))
        .route("/:id", patch(update).delete(remove))
        .layer(Extension(kind))
}

fn new_account_from_form(kind: PrincipalKind, form: &UploadForm) -> Result<NewAccount, ApiError> {
    let account = NewAccount {
        kind,
        first_name: form.required("firstName")?.to_string(),
        last_name: form.required("lastName")?.to_string(),
        email: form.required("email")?.to_string(),
        phone: form.text("phone").map(str::to_string),
        gender: form.text("gender").map(str::to_string),
        address: form.text("address").map(str::to_string),
        profile: form.file.clone(),
        designation: form.text("designation").map(str::to_string),
        enrollment_no: form.text("enrollmentNo").map(str::to_string),
        semester: form.parsed("semester")?,
        branch_id: form.parsed("branchId")?,
        emergency_name: form.text("emergencyContact[name]").map(str::to_string),
        emergency_relationship: form
            .text("emergencyContact[relationship]")
            .map(str::to_string),
        emergency_phone: form.text("emergencyContact[phone]").map(str::to_string),
        password_hash: String::new(),
    };

    if !account.email.contains('@') {
        return Err(ApiError::BadRequest("Invalid email format".to_string()));
    }

    // Kind-specific required fields.
    match kind {
        PrincipalKind::Student => {
            if account.enrollment_no.is_none() {
                return Err(ApiError::BadRequest(
                    "Enrollment number is required for students".to_string(),
                ));
            }
            if account.semester.is_none() || account.branch_id.is_none() {
                return Err(ApiError::BadRequest(
                    "Semester and branch are required for students".to_string(),
                ));
            }
        }
        PrincipalKind::Faculty => {
            if account.branch_id.is_none() {
                return Err(ApiError::BadRequest(
                    "Branch is required for faculty".to_string(),
                ));
            }
        }
        PrincipalKind::Admin => {}
    }

    Ok(account)
}

/// Register a new account of this kind; admin only. The account starts with
/// the kind's default password and must change it to clear the login notice.
pub async fn register(
    State(state): State<AppState>,
    Extension(kind): Extension<PrincipalKind>,
    Extension(principal): Extension<AuthPrincipal>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    if !is_allowed(
        &principal,
        Action::Create,
        ResourceKind::Account(kind),
        &ResourceScope::Global,
    ) {
        return Err(ApiError::Forbidden);
    }

    let form = upload::collect(multipart, &state.media_dir).await?;
    let mut payload = match new_account_from_form(kind, &form) {
        Ok(payload) => payload,
        Err(e) => {
            upload::discard(&state.media_dir, form.file.as_deref()).await;
            return Err(e);
        }
    };

    let taken = state
        .accounts
        .email_taken(kind, &payload.email)
        .await
        .map_err(|e| {
            error!("Failed to check email: {}", e);
            ApiError::InternalServerError
        })?;
    if taken {
        upload::discard(&state.media_dir, form.file.as_deref()).await;
        return Err(ApiError::BadRequest("Email already registered".to_string()));
    }

    payload.password_hash = hash_password(kind.default_password()).map_err(|e| {
        error!("Failed to hash default password: {}", e);
        ApiError::InternalServerError
    })?;

    let account = state.accounts.create(&payload).await.map_err(|e| {
        error!("Failed to create account: {}", e);
        ApiError::InternalServerError
    })?;

    Ok((
        StatusCode::CREATED,
        Json(Envelope::ok("Account registered successfully", account)),
    ))
}

/// List accounts of this kind; admin only. Student listing supports search
/// by enrollment number, name, semester, and branch.
pub async fn list(
    State(state): State<AppState>,
    Extension(kind): Extension<PrincipalKind>,
    Extension(principal): Extension<AuthPrincipal>,
    Query(query): Query<AccountQuery>,
) -> Result<impl IntoResponse, ApiError> {
    if !is_allowed(
        &principal,
        Action::Read,
        ResourceKind::Account(kind),
        &ResourceScope::Global,
    ) {
        return Err(ApiError::Forbidden);
    }

    let accounts = state.accounts.list(kind, &query).await.map_err(|e| {
        error!("Failed to list accounts: {}", e);
        ApiError::InternalServerError
    })?;

    Ok(Json(Envelope::ok("Accounts fetched successfully", accounts)))
}

/// The caller's record is served only from this router's kind; a faculty
/// token asking `/api/student/my-details` gets a 404, not someone's record.
fn own_account(account: Option<Account>, kind: PrincipalKind) -> Result<Account, ApiError> {
    account
        .filter(|account| account.kind == kind)
        .ok_or_else(|| ApiError::NotFound("Account not found".to_string()))
}

/// Return the caller's own record
pub async fn my_details(
    State(state): State<AppState>,
    Extension(kind): Extension<PrincipalKind>,
    Extension(principal): Extension<AuthPrincipal>,
) -> Result<impl IntoResponse, ApiError> {
    if !is_allowed(
        &principal,
        Action::Read,
        ResourceKind::Profile,
        &ResourceScope::Principal(principal.id),
    ) {
        return Err(ApiError::Forbidden);
    }

    let account = state.accounts.find_by_id(principal.id).await.map_err(|e| {
        error!("Failed to load account: {}", e);
        ApiError::InternalServerError
    })?;
    let account = own_account(account, kind)?;

    Ok(Json(Envelope::ok("Details fetched successfully", account)))
}

/// Build an update payload from the form. `semester` and `branchId` decide
/// which resources a student or faculty member can reach, so they are only
/// honored when the caller manages accounts; on a self edit they are dropped.
fn update_account_from_form(
    form: &UploadForm,
    allow_scope_change: bool,
) -> Result<UpdateAccount, ApiError> {
    let (semester, branch_id) = if allow_scope_change {
        (form.parsed("semester")?, form.parsed("branchId")?)
    } else {
        (None, None)
    };

    Ok(UpdateAccount {
        first_name: form.text("firstName").map(str::to_string),
        last_name: form.text("lastName").map(str::to_string),
        email: form.text("email").map(str::to_string),
        phone: form.text("phone").map(str::to_string),
        gender: form.text("gender").map(str::to_string),
        address: form.text("address").map(str::to_string),
        profile: form.file.clone(),
        designation: form.text("designation").map(str::to_string),
        semester,
        branch_id,
        emergency_name: form.text("emergencyContact[name]").map(str::to_string),
        emergency_relationship: form
            .text("emergencyContact[relationship]")
            .map(str::to_string),
        emergency_phone: form.text("emergencyContact[phone]").map(str::to_string),
    })
}

/// Update an account. Principals may edit their own record; anything else is
/// admin-only account management.
pub async fn update(
    State(state): State<AppState>,
    Extension(kind): Extension<PrincipalKind>,
    Extension(principal): Extension<AuthPrincipal>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let allowed = if id == principal.id {
        is_allowed(
            &principal,
            Action::Update,
            ResourceKind::Profile,
            &ResourceScope::Principal(id),
        )
    } else {
        is_allowed(
            &principal,
            Action::Update,
            ResourceKind::Account(kind),
            &ResourceScope::Global,
        )
    };
    if !allowed {
        return Err(ApiError::Forbidden);
    }

    let form = upload::collect(multipart, &state.media_dir).await?;
    let payload = match update_account_from_form(&form, principal.kind == PrincipalKind::Admin) {
        Ok(payload) => payload,
        Err(e) => {
            upload::discard(&state.media_dir, form.file.as_deref()).await;
            return Err(e);
        }
    };

    let account = state
        .accounts
        .update(id, kind, &payload)
        .await
        .map_err(|e| {
            error!("Failed to update account: {}", e);
            ApiError::InternalServerError
        })?
        .ok_or_else(|| ApiError::NotFound("Account not found".to_string()))?;

    Ok(Json(Envelope::ok("Account updated successfully", account)))
}

/// Deactivate an account; admin only. A soft status flip, never a hard delete.
pub async fn remove(
    State(state): State<AppState>,
    Extension(kind): Extension<PrincipalKind>,
    Extension(principal): Extension<AuthPrincipal>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    if !is_allowed(
        &principal,
        Action::Delete,
        ResourceKind::Account(kind),
        &ResourceScope::Global,
    ) {
        return Err(ApiError::Forbidden);
    }

    let deactivated = state.accounts.deactivate(id, kind).await.map_err(|e| {
        error!("Failed to deactivate account: {}", e);
        ApiError::InternalServerError
    })?;

    if !deactivated {
        return Err(ApiError::NotFound("Account not found".to_string()));
    }

    Ok(Json(Envelope::ok(
        "Account deactivated successfully",
        serde_json::json!({ "id": id }),
    )))
}

/// Change the caller's own password
pub async fn change_password(
    State(state): State<AppState>,
    Extension(principal): Extension<AuthPrincipal>,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if !is_allowed(
        &principal,
        Action::Update,
        ResourceKind::Password,
        &ResourceScope::Principal(principal.id),
    ) {
        return Err(ApiError::Forbidden);
    }

    if payload.new_password.len() < 8 {
        return Err(ApiError::BadRequest(
            "Password must be at least 8 characters long".to_string(),
        ));
    }

    let current_hash = state
        .accounts
        .password_hash(principal.id)
        .await
        .map_err(|e| {
            error!("Failed to load password hash: {}", e);
            ApiError::InternalServerError
        })?
        .ok_or(ApiError::UnknownPrincipal)?;

    let current_ok = verify_password(&current_hash, &payload.current_password).map_err(|e| {
        error!("Failed to verify password: {}", e);
        ApiError::InternalServerError
    })?;
    if !current_ok {
        return Err(ApiError::BadRequest(
            "Current password is incorrect".to_string(),
        ));
    }

    let new_hash = hash_password(&payload.new_password).map_err(|e| {
        error!("Failed to hash password: {}", e);
        ApiError::InternalServerError
    })?;

    state
        .accounts
        .set_password(principal.id, &new_hash)
        .await
        .map_err(|e| {
            error!("Failed to store password: {}", e);
            ApiError::InternalServerError
        })?;

    Ok(Json(Envelope::ok(
        "Password changed successfully",
        serde_json::json!({ "changed": true }),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn account(kind: PrincipalKind, id: Uuid) -> Account {
        Account {
            id,
            kind,
            first_name: "Asha".to_string(),
            last_name: "Rao".to_string(),
            email: "asha@college.test".to_string(),
            phone: None,
            gender: None,
            address: None,
            profile: None,
            designation: None,
            enrollment_no: Some("20230042".to_string()),
            semester: Some(3),
            branch_id: Some(Uuid::new_v4()),
            emergency_name: None,
            emergency_relationship: None,
            emergency_phone: None,
            status: "active".to_string(),
            password_changed: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_self_update_drops_scope_fields() {
        let branch = Uuid::new_v4();
        let form = UploadForm::with_fields(&[
            ("firstName", "Asha"),
            ("semester", "7"),
            ("branchId", &branch.to_string()),
        ]);

        // A non-admin editing their own record cannot move themselves to
        // another semester or branch.
        let payload = update_account_from_form(&form, false).unwrap();
        assert_eq!(payload.first_name, Some("Asha".to_string()));
        assert_eq!(payload.semester, None);
        assert_eq!(payload.branch_id, None);
    }

    #[test]
    fn test_admin_update_honors_scope_fields() {
        let branch = Uuid::new_v4();
        let form = UploadForm::with_fields(&[
            ("semester", "7"),
            ("branchId", &branch.to_string()),
        ]);

        let payload = update_account_from_form(&form, true).unwrap();
        assert_eq!(payload.semester, Some(7));
        assert_eq!(payload.branch_id, Some(branch));
    }

    #[test]
    fn test_own_account_requires_matching_kind() {
        let id = Uuid::new_v4();

        let found = own_account(Some(account(PrincipalKind::Student, id)), PrincipalKind::Student)
            .unwrap();
        assert_eq!(found.id, id);

        // A faculty record is invisible through the student router.
        assert!(matches!(
            own_account(Some(account(PrincipalKind::Faculty, id)), PrincipalKind::Student),
            Err(ApiError::NotFound(_))
        ));
        assert!(matches!(
            own_account(None, PrincipalKind::Student),
            Err(ApiError::NotFound(_))
        ));
    }

    #[test]
    fn test_student_registration_requires_scope_fields() {
        let form = UploadForm::with_fields(&[
            ("firstName", "Asha"),
            ("lastName", "Rao"),
            ("email", "asha@college.test"),
            ("enrollmentNo", "20230042"),
        ]);

        assert!(matches!(
            new_account_from_form(PrincipalKind::Student, &form),
            Err(ApiError::BadRequest(_))
        ));
    }
}
