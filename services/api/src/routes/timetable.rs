//! Timetable routes

use axum::{
    Extension, Json, Router,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get},
};
use common::Envelope;
use tracing::{error, warn};
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::AuthPrincipal;
use crate::models::timetable::{NewTimetable, TimetableQuery};
use crate::policy::{Action, ResourceKind, ResourceScope, is_allowed};
use crate::routes::{read_scope, scoped_filters};
use crate::state::AppState;
use crate::upload;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/:id", delete(remove))
}

/// List timetables within the caller's scope
pub async fn list(
    State(state): State<AppState>,
    Extension(principal): Extension<AuthPrincipal>,
    Query(query): Query<TimetableQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let (semester, branch) = scoped_filters(&principal, query.semester, query.branch)?;
    if !is_allowed(
        &principal,
        Action::Read,
        ResourceKind::Timetable,
        &read_scope(semester, branch),
    ) {
        return Err(ApiError::Forbidden);
    }

    let filtered = TimetableQuery { semester, branch };
    let timetables = state.timetables.list(&filtered).await.map_err(|e| {
        error!("Failed to list timetables: {}", e);
        ApiError::InternalServerError
    })?;

    Ok(Json(Envelope::ok(
        "Timetables fetched successfully",
        timetables,
    )))
}

fn new_timetable_from_form(form: &upload::UploadForm) -> Result<NewTimetable, ApiError> {
    Ok(NewTimetable {
        semester: form.required_parsed("semester")?,
        branch_id: form.required_parsed("branch")?,
        file: form
            .file
            .clone()
            .ok_or_else(|| ApiError::BadRequest("Timetable file is required".to_string()))?,
    })
}

/// Upload a timetable image; admin only
pub async fn create(
    State(state): State<AppState>,
    Extension(principal): Extension<AuthPrincipal>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    if !is_allowed(
        &principal,
        Action::Create,
        ResourceKind::Timetable,
        &ResourceScope::Global,
    ) {
        return Err(ApiError::Forbidden);
    }

    let form = upload::collect(multipart, &state.media_dir).await?;

    // A malformed request must not leave the stored file behind.
    let payload = match new_timetable_from_form(&form) {
        Ok(payload) => payload,
        Err(e) => {
            upload::discard(&state.media_dir, form.file.as_deref()).await;
            return Err(e);
        }
    };

    let timetable = state.timetables.create(&payload).await.map_err(|e| {
        error!("Failed to create timetable: {}", e);
        ApiError::InternalServerError
    })?;

    Ok((
        StatusCode::CREATED,
        Json(Envelope::ok("Timetable uploaded successfully", timetable)),
    ))
}

/// Delete a timetable; admin only
pub async fn remove(
    State(state): State<AppState>,
    Extension(principal): Extension<AuthPrincipal>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    if !is_allowed(
        &principal,
        Action::Delete,
        ResourceKind::Timetable,
        &ResourceScope::Global,
    ) {
        return Err(ApiError::Forbidden);
    }

    let timetable = state
        .timetables
        .find_by_id(id)
        .await
        .map_err(|e| {
            error!("Failed to load timetable: {}", e);
            ApiError::InternalServerError
        })?
        .ok_or_else(|| ApiError::NotFound("Timetable not found".to_string()))?;

    state.timetables.delete(id).await.map_err(|e| {
        error!("Failed to delete timetable: {}", e);
        ApiError::InternalServerError
    })?;

    // Best effort; the record is already gone.
    if let Err(e) = tokio::fs::remove_file(state.media_dir.join(&timetable.file)).await {
        warn!("Failed to remove timetable file {}: {}", timetable.file, e);
    }

    Ok(Json(Envelope::ok(
        "Timetable deleted successfully",
        serde_json::json!({ "id": id }),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upload::UploadForm;

    #[test]
    fn test_timetable_payload_requires_scope_and_file() {
        let branch = Uuid::new_v4();
        let form = UploadForm::with_fields(&[("semester", "3"), ("branch", &branch.to_string())])
            .and_file("sem3.png");

        let payload = new_timetable_from_form(&form).unwrap();
        assert_eq!(payload.semester, 3);
        assert_eq!(payload.branch_id, branch);
        assert_eq!(payload.file, "sem3.png");

        // Missing the file, or missing the scope fields, is a bad request.
        let no_file = UploadForm::with_fields(&[("semester", "3"), ("branch", &branch.to_string())]);
        assert!(matches!(
            new_timetable_from_form(&no_file),
            Err(ApiError::BadRequest(_))
        ));
        let no_scope = UploadForm::with_fields(&[]).and_file("sem3.png");
        assert!(matches!(
            new_timetable_from_form(&no_scope),
            Err(ApiError::BadRequest(_))
        ));
    }
}
