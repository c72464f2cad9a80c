//! Notice routes

use axum::{
    Extension, Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch},
};
use common::Envelope;
use tracing::error;
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::AuthPrincipal;
use crate::models::notice::{NewNotice, UpdateNotice};
use crate::policy::{Action, ResourceKind, ResourceScope, is_allowed};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/:id", patch(update).delete(remove))
}

/// List notices addressed to the caller's kind
pub async fn list(
    State(state): State<AppState>,
    Extension(principal): Extension<AuthPrincipal>,
) -> Result<impl IntoResponse, ApiError> {
    let mut notices = state.notices.list().await.map_err(|e| {
        error!("Failed to list notices: {}", e);
        ApiError::InternalServerError
    })?;

    // Audience filtering goes through the policy table, per notice.
    notices.retain(|notice| {
        is_allowed(
            &principal,
            Action::Read,
            ResourceKind::Notice,
            &ResourceScope::Audience {
                student: notice.for_student,
                faculty: notice.for_faculty,
            },
        )
    });

    Ok(Json(Envelope::ok("Notices fetched successfully", notices)))
}

/// Post a notice; admin only
pub async fn create(
    State(state): State<AppState>,
    Extension(principal): Extension<AuthPrincipal>,
    Json(payload): Json<NewNotice>,
) -> Result<impl IntoResponse, ApiError> {
    if !is_allowed(
        &principal,
        Action::Create,
        ResourceKind::Notice,
        &ResourceScope::Global,
    ) {
        return Err(ApiError::Forbidden);
    }

    if payload.title.trim().is_empty() {
        return Err(ApiError::BadRequest("Notice title is required".to_string()));
    }
    if !payload.for_student && !payload.for_faculty {
        return Err(ApiError::BadRequest(
            "Notice must address students, faculty, or both".to_string(),
        ));
    }

    let notice = state.notices.create(&payload).await.map_err(|e| {
        error!("Failed to create notice: {}", e);
        ApiError::InternalServerError
    })?;

    Ok((
        StatusCode::CREATED,
        Json(Envelope::ok("Notice created successfully", notice)),
    ))
}

/// Update a notice; admin only
pub async fn update(
    State(state): State<AppState>,
    Extension(principal): Extension<AuthPrincipal>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateNotice>,
) -> Result<impl IntoResponse, ApiError> {
    if !is_allowed(
        &principal,
        Action::Update,
        ResourceKind::Notice,
        &ResourceScope::Global,
    ) {
        return Err(ApiError::Forbidden);
    }

    let notice = state
        .notices
        .update(id, &payload)
        .await
        .map_err(|e| {
            error!("Failed to update notice: {}", e);
            ApiError::InternalServerError
        })?
        .ok_or_else(|| ApiError::NotFound("Notice not found".to_string()))?;

    Ok(Json(Envelope::ok("Notice updated successfully", notice)))
}

/// Delete a notice; admin only
pub async fn remove(
    State(state): State<AppState>,
    Extension(principal): Extension<AuthPrincipal>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    if !is_allowed(
        &principal,
        Action::Delete,
        ResourceKind::Notice,
        &ResourceScope::Global,
    ) {
        return Err(ApiError::Forbidden);
    }

    let deleted = state.notices.delete(id).await.map_err(|e| {
        error!("Failed to delete notice: {}", e);
        ApiError::InternalServerError
    })?;

    if !deleted {
        return Err(ApiError::NotFound("Notice not found".to_string()));
    }

    Ok(Json(Envelope::ok(
        "Notice deleted successfully",
        serde_json::json!({ "id": id }),
    )))
}
