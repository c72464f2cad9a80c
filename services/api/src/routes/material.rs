//! Study material routes

use axum::{
    Extension, Json, Router,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch},
};
use common::Envelope;
use tracing::{error, warn};
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::AuthPrincipal;
use crate::models::material::{MATERIAL_TYPES, MaterialQuery, NewMaterial, UpdateMaterial};
use crate::policy::{Action, ResourceKind, ResourceScope, is_allowed};
use crate::routes::{read_scope, scoped_filters};
use crate::state::AppState;
use crate::upload;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/:id", patch(update).delete(remove))
}

fn validate_material_type(material_type: &str) -> Result<(), ApiError> {
    if MATERIAL_TYPES.contains(&material_type) {
        Ok(())
    } else {
        Err(ApiError::BadRequest(format!(
            "Material type must be one of: {}",
            MATERIAL_TYPES.join(", ")
        )))
    }
}

/// List materials within the caller's scope
pub async fn list(
    State(state): State<AppState>,
    Extension(principal): Extension<AuthPrincipal>,
    Query(query): Query<MaterialQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let (semester, branch) = scoped_filters(&principal, query.semester, query.branch)?;
    if !is_allowed(
        &principal,
        Action::Read,
        ResourceKind::Material,
        &read_scope(semester, branch),
    ) {
        return Err(ApiError::Forbidden);
    }

    let filtered = MaterialQuery {
        semester,
        branch,
        subject: query.subject,
        material_type: query.material_type.clone(),
    };
    let materials = state.materials.list(&filtered).await.map_err(|e| {
        error!("Failed to list materials: {}", e);
        ApiError::InternalServerError
    })?;

    Ok(Json(Envelope::ok("Materials fetched successfully", materials)))
}

/// Authorize and assemble the upload payload. The branch comes from the form,
/// so the policy check can only happen after the stream is drained.
fn new_material_from_form(
    principal: &AuthPrincipal,
    form: &upload::UploadForm,
) -> Result<NewMaterial, ApiError> {
    let branch_id: Uuid = form.required_parsed("branch")?;
    if !is_allowed(
        principal,
        Action::Create,
        ResourceKind::Material,
        &ResourceScope::Branch(branch_id),
    ) {
        return Err(ApiError::Forbidden);
    }

    let material_type = form.required("type")?.to_string();
    validate_material_type(&material_type)?;

    Ok(NewMaterial {
        title: form.required("title")?.to_string(),
        subject_id: form.required_parsed("subject")?,
        semester: form.required_parsed("semester")?,
        branch_id,
        material_type,
        file: form
            .file
            .clone()
            .ok_or_else(|| ApiError::BadRequest("Material file is required".to_string()))?,
        uploaded_by: principal.id,
    })
}

/// Upload a material; faculty within their own branch, or admin
pub async fn create(
    State(state): State<AppState>,
    Extension(principal): Extension<AuthPrincipal>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let form = upload::collect(multipart, &state.media_dir).await?;

    // A denied or malformed request must not leave the stored file behind.
    let payload = match new_material_from_form(&principal, &form) {
        Ok(payload) => payload,
        Err(e) => {
            upload::discard(&state.media_dir, form.file.as_deref()).await;
            return Err(e);
        }
    };

    let material = state.materials.create(&payload).await.map_err(|e| {
        error!("Failed to create material: {}", e);
        ApiError::InternalServerError
    })?;

    Ok((
        StatusCode::CREATED,
        Json(Envelope::ok("Material uploaded successfully", material)),
    ))
}

/// Update a material's title or type; faculty within their own branch, or admin
pub async fn update(
    State(state): State<AppState>,
    Extension(principal): Extension<AuthPrincipal>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateMaterial>,
) -> Result<impl IntoResponse, ApiError> {
    let existing = state
        .materials
        .find_by_id(id)
        .await
        .map_err(|e| {
            error!("Failed to load material: {}", e);
            ApiError::InternalServerError
        })?
        .ok_or_else(|| ApiError::NotFound("Material not found".to_string()))?;

    if !is_allowed(
        &principal,
        Action::Update,
        ResourceKind::Material,
        &ResourceScope::Branch(existing.branch_id),
    ) {
        return Err(ApiError::Forbidden);
    }

    if let Some(material_type) = &payload.material_type {
        validate_material_type(material_type)?;
    }

    let material = state
        .materials
        .update(id, &payload)
        .await
        .map_err(|e| {
            error!("Failed to update material: {}", e);
            ApiError::InternalServerError
        })?
        .ok_or_else(|| ApiError::NotFound("Material not found".to_string()))?;

    Ok(Json(Envelope::ok("Material updated successfully", material)))
}

/// Delete a material; faculty within their own branch, or admin
pub async fn remove(
    State(state): State<AppState>,
    Extension(principal): Extension<AuthPrincipal>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let existing = state
        .materials
        .find_by_id(id)
        .await
        .map_err(|e| {
            error!("Failed to load material: {}", e);
            ApiError::InternalServerError
        })?
        .ok_or_else(|| ApiError::NotFound("Material not found".to_string()))?;

    if !is_allowed(
        &principal,
        Action::Delete,
        ResourceKind::Material,
        &ResourceScope::Branch(existing.branch_id),
    ) {
        return Err(ApiError::Forbidden);
    }

    state.materials.delete(id).await.map_err(|e| {
        error!("Failed to delete material: {}", e);
        ApiError::InternalServerError
    })?;

    // Best effort; the record is already gone.
    if let Err(e) = tokio::fs::remove_file(state.media_dir.join(&existing.file)).await {
        warn!("Failed to remove material file {}: {}", existing.file, e);
    }

    Ok(Json(Envelope::ok(
        "Material deleted successfully",
        serde_json::json!({ "id": id }),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upload::UploadForm;
    use common::PrincipalKind;

    fn faculty(branch_id: Uuid) -> AuthPrincipal {
        AuthPrincipal {
            id: Uuid::new_v4(),
            kind: PrincipalKind::Faculty,
            semester: None,
            branch_id: Some(branch_id),
        }
    }

    fn material_form(branch: Uuid) -> UploadForm {
        UploadForm::with_fields(&[
            ("title", "Unit 1 notes"),
            ("subject", &Uuid::new_v4().to_string()),
            ("semester", "3"),
            ("branch", &branch.to_string()),
            ("type", "notes"),
        ])
        .and_file("abc-notes.pdf")
    }

    #[test]
    fn test_material_upload_payload_in_own_branch() {
        let branch = Uuid::new_v4();
        let uploader = faculty(branch);

        let payload = new_material_from_form(&uploader, &material_form(branch)).unwrap();
        assert_eq!(payload.branch_id, branch);
        assert_eq!(payload.uploaded_by, uploader.id);
        assert_eq!(payload.file, "abc-notes.pdf");
    }

    #[test]
    fn test_material_upload_denied_outside_own_branch() {
        let uploader = faculty(Uuid::new_v4());
        let form = material_form(Uuid::new_v4());

        assert!(matches!(
            new_material_from_form(&uploader, &form),
            Err(ApiError::Forbidden)
        ));
    }

    #[test]
    fn test_material_upload_denied_for_students() {
        let branch = Uuid::new_v4();
        let uploader = AuthPrincipal {
            id: Uuid::new_v4(),
            kind: PrincipalKind::Student,
            semester: Some(3),
            branch_id: Some(branch),
        };

        assert!(matches!(
            new_material_from_form(&uploader, &material_form(branch)),
            Err(ApiError::Forbidden)
        ));
    }

    #[test]
    fn test_material_upload_rejects_unknown_type() {
        let branch = Uuid::new_v4();
        let form = UploadForm::with_fields(&[
            ("title", "Unit 1 notes"),
            ("subject", &Uuid::new_v4().to_string()),
            ("semester", "3"),
            ("branch", &branch.to_string()),
            ("type", "midterm"),
        ])
        .and_file("abc-notes.pdf");

        assert!(matches!(
            new_material_from_form(&faculty(branch), &form),
            Err(ApiError::BadRequest(_))
        ));
    }
}
