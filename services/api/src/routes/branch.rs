//! Branch routes

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
use crate::models::branch::{BranchQuery, NewBranch, UpdateBranch};
use crate::policy::{Action, ResourceKind, ResourceScope, is_allowed};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/:id", patch(update).delete(remove))
}

/// List branches; readable by any authenticated principal
pub async fn list(
    State(state): State<AppState>,
    Extension(principal): Extension<AuthPrincipal>,
    Query(query): Query<BranchQuery>,
) -> Result<impl IntoResponse, ApiError> {
    if !is_allowed(
        &principal,
        Action::Read,
        ResourceKind::Branch,
        &ResourceScope::Global,
    ) {
        return Err(ApiError::Forbidden);
    }

    let branches = state.branches.list(&query).await.map_err(|e| {
        error!("Failed to list branches: {}", e);
        ApiError::InternalServerError
    })?;

    Ok(Json(Envelope::ok("Branches fetched successfully", branches)))
}

/// Create a branch; admin only
pub async fn create(
    State(state): State<AppState>,
    Extension(principal): Extension<AuthPrincipal>,
    Json(payload): Json<NewBranch>,
) -> Result<impl IntoResponse, ApiError> {
    if !is_allowed(
        &principal,
        Action::Create,
        ResourceKind::Branch,
        &ResourceScope::Global,
    ) {
        return Err(ApiError::Forbidden);
    }

    if payload.name.trim().is_empty() {
        return Err(ApiError::BadRequest("Branch name is required".to_string()));
    }

    let branch = state.branches.create(&payload).await.map_err(|e| {
        error!("Failed to create branch: {}", e);
        ApiError::InternalServerError
    })?;

    Ok((
        StatusCode::CREATED,
        Json(Envelope::ok("Branch created successfully", branch)),
    ))
}

/// Update a branch; admin only
pub async fn update(
    State(state): State<AppState>,
    Extension(principal): Extension<AuthPrincipal>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateBranch>,
) -> Result<impl IntoResponse, ApiError> {
    if !is_allowed(
        &principal,
        Action::Update,
        ResourceKind::Branch,
        &ResourceScope::Global,
    ) {
        return Err(ApiError::Forbidden);
    }

    let branch = state
        .branches
        .update(id, &payload)
        .await
        .map_err(|e| {
            error!("Failed to update branch: {}", e);
            ApiError::InternalServerError
        })?
        .ok_or_else(|| ApiError::NotFound("Branch not found".to_string()))?;

    Ok(Json(Envelope::ok("Branch updated successfully", branch)))
}

/// Delete a branch; admin only
pub async fn remove(
    State(state): State<AppState>,
    Extension(principal): Extension<AuthPrincipal>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    if !is_allowed(
        &principal,
        Action::Delete,
        ResourceKind::Branch,
        &ResourceScope::Global,
    ) {
        return Err(ApiError::Forbidden);
    }

    let deleted = state.branches.delete(id).await.map_err(|e| {
        error!("Failed to delete branch: {}", e);
        ApiError::InternalServerError
    })?;

    if !deleted {
        return Err(ApiError::NotFound("Branch not found".to_string()));
    }

    Ok(Json(Envelope::ok(
        "Branch deleted successfully",
        serde_json::json!({ "id": id }),
    )))
}
