//! API service routes

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router, middleware, response::IntoResponse};
use common::PrincipalKind;
use tower_http::services::ServeDir;
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::{AuthPrincipal, access_guard};
use crate::policy::ResourceScope;
use crate::state::AppState;

pub mod account;
pub mod branch;
pub mod material;
pub mod notice;
pub mod subject;
pub mod timetable;

/// Create the router for the API service
pub fn create_router(state: AppState) -> Router {
    let protected = Router::new()
        .nest("/api/branch", branch::router())
        .nest("/api/subject", subject::router())
        .nest("/api/notice", notice::router())
        .nest("/api/timetable", timetable::router())
        .nest("/api/material", material::router())
        .nest("/api/admin", account::router(PrincipalKind::Admin))
        .nest("/api/faculty", account::router(PrincipalKind::Faculty))
        .nest("/api/student", account::router(PrincipalKind::Student))
        .route_layer(middleware::from_fn_with_state(state.clone(), access_guard));

    Router::new()
        .route("/health", get(health_check))
        .nest_service("/media", ServeDir::new(&state.media_dir))
        .merge(protected)
        .with_state(state)
}

/// Health check endpoint; also reports database reachability
pub async fn health_check(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let database_ok = common::database::health_check(&state.db_pool).await?;

    Ok(Json(serde_json::json!({
        "status": if database_ok { "ok" } else { "degraded" },
        "service": "api-service"
    })))
}

/// Narrow the caller's requested semester/branch filters to what their own
/// scope permits. Admins query anything; students are pinned to their own
/// semester and branch; faculty are pinned to their branch.
pub(crate) fn scoped_filters(
    principal: &AuthPrincipal,
    semester: Option<i16>,
    branch: Option<Uuid>,
) -> Result<(Option<i16>, Option<Uuid>), ApiError> {
    match principal.kind {
        PrincipalKind::Admin => Ok((semester, branch)),
        PrincipalKind::Student => {
            let own_semester = principal.semester.ok_or(ApiError::Forbidden)?;
            let own_branch = principal.branch_id.ok_or(ApiError::Forbidden)?;
            Ok((Some(own_semester), Some(own_branch)))
        }
        PrincipalKind::Faculty => {
            let own_branch = principal.branch_id.ok_or(ApiError::Forbidden)?;
            Ok((semester, Some(own_branch)))
        }
    }
}

/// Build the policy scope for a semester/branch filtered read.
pub(crate) fn read_scope(semester: Option<i16>, branch: Option<Uuid>) -> ResourceScope {
    match (semester, branch) {
        (Some(semester), Some(branch_id)) => ResourceScope::SemesterBranch {
            semester,
            branch_id,
        },
        (_, Some(branch_id)) => ResourceScope::Branch(branch_id),
        _ => ResourceScope::Global,
    }
}
