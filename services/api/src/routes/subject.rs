//! Subject routes

use axum::{
    Extension, Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch},
};
use common::Envelope;
use tracing::error;
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::AuthPrincipal;
use crate::models::subject::{NewSubject, SubjectQuery, UpdateSubject};
use crate::policy::{Action, ResourceKind, ResourceScope, is_allowed};
use crate::routes::{read_scope, scoped_filters};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/:id", patch(update).delete(remove))
}

/// List subjects within the caller's scope
pub async fn list(
    State(state): State<AppState>,
    Extension(principal): Extension<AuthPrincipal>,
    Query(query): Query<SubjectQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let (semester, branch) = scoped_filters(&principal, query.semester, query.branch)?;
    if !is_allowed(
        &principal,
        Action::Read,
        ResourceKind::Subject,
        &read_scope(semester, branch),
    ) {
        return Err(ApiError::Forbidden);
    }

    let filtered = SubjectQuery { semester, branch };
    let subjects = state.subjects.list(&filtered).await.map_err(|e| {
        error!("Failed to list subjects: {}", e);
        ApiError::InternalServerError
    })?;

    Ok(Json(Envelope::ok("Subjects fetched successfully", subjects)))
}

/// Create a subject; admin only
pub async fn create(
    State(state): State<AppState>,
    Extension(principal): Extension<AuthPrincipal>,
    Json(payload): Json<NewSubject>,
) -> Result<impl IntoResponse, ApiError> {
    if !is_allowed(
        &principal,
        Action::Create,
        ResourceKind::Subject,
        &ResourceScope::Global,
    ) {
        return Err(ApiError::Forbidden);
    }

    if payload.name.trim().is_empty() || payload.code.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "Subject name and code are required".to_string(),
        ));
    }

    let subject = state.subjects.create(&payload).await.map_err(|e| {
        error!("Failed to create subject: {}", e);
        ApiError::InternalServerError
    })?;

    Ok((
        StatusCode::CREATED,
        Json(Envelope::ok("Subject created successfully", subject)),
    ))
}

/// Update a subject; admin only
pub async fn update(
    State(state): State<AppState>,
    Extension(principal): Extension<AuthPrincipal>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateSubject>,
) -> Result<impl IntoResponse, ApiError> {
    if !is_allowed(
        &principal,
        Action::Update,
        ResourceKind::Subject,
        &ResourceScope::Global,
    ) {
        return Err(ApiError::Forbidden);
    }

    let subject = state
        .subjects
        .update(id, &payload)
        .await
        .map_err(|e| {
            error!("Failed to update subject: {}", e);
            ApiError::InternalServerError
        })?
        .ok_or_else(|| ApiError::NotFound("Subject not found".to_string()))?;

    Ok(Json(Envelope::ok("Subject updated successfully", subject)))
}

/// Delete a subject; admin only
pub async fn remove(
    State(state): State<AppState>,
    Extension(principal): Extension<AuthPrincipal>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    if !is_allowed(
        &principal,
        Action::Delete,
        ResourceKind::Subject,
        &ResourceScope::Global,
    ) {
        return Err(ApiError::Forbidden);
    }

    let deleted = state.subjects.delete(id).await.map_err(|e| {
        error!("Failed to delete subject: {}", e);
        ApiError::InternalServerError
    })?;

    if !deleted {
        return Err(ApiError::NotFound("Subject not found".to_string()));
    }

    Ok(Json(Envelope::ok(
        "Subject deleted successfully",
        serde_json::json!({ "id": id }),
    )))
}
