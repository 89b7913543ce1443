//! Staff directory and role endpoints.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;

use super::{current_revision, error, respond, success, ApiResult};
use crate::auth::CurrentUser;
use crate::models::{CreateRoleRequest, CreateUserRequest, Role, StaffView, UpdateUserRequest};
use crate::AppState;

/// Body returned after firing a staff member.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FiredResponse {
    pub id: String,
}

/// GET /api/staff - List staff with their role badges.
pub async fn list_staff(State(state): State<AppState>) -> ApiResult<Vec<StaffView>> {
    let revision_id = current_revision(&state).await;

    match state.dashboard.list_staff().await {
        Ok(staff) => success(staff, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// GET /api/staff/{id} - Get a single staff member.
pub async fn get_staff(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StaffView> {
    let revision_id = current_revision(&state).await;

    match state.dashboard.get_staff(&id).await {
        Ok(view) => success(view, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// POST /api/staff - Create a staff member.
pub async fn create_staff(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Json(request): Json<CreateUserRequest>,
) -> ApiResult<StaffView> {
    let revision_id = current_revision(&state).await;
    let result = state.dashboard.create_user(&actor, request).await;
    respond(&state, revision_id, result).await
}

/// PUT /api/staff/{id} - Update access level, role, title or profile.
pub async fn update_staff(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(id): Path<String>,
    Json(request): Json<UpdateUserRequest>,
) -> ApiResult<StaffView> {
    let revision_id = current_revision(&state).await;
    let result = state.dashboard.update_user(&actor, &id, request).await;
    respond(&state, revision_id, result).await
}

/// DELETE /api/staff/{id} - Fire a staff member.
pub async fn fire_staff(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<FiredResponse> {
    let revision_id = current_revision(&state).await;
    let result = state
        .dashboard
        .fire_staff(&actor, &id)
        .await
        .map(|_| FiredResponse { id });
    respond(&state, revision_id, result).await
}

/// GET /api/roles - List roles.
pub async fn list_roles(State(state): State<AppState>) -> ApiResult<Vec<Role>> {
    let revision_id = current_revision(&state).await;

    match state.dashboard.list_roles().await {
        Ok(roles) => success(roles, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// POST /api/roles - Create a role.
pub async fn create_role(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Json(request): Json<CreateRoleRequest>,
) -> ApiResult<Role> {
    let revision_id = current_revision(&state).await;
    let result = state.dashboard.create_role(&actor, request).await;
    respond(&state, revision_id, result).await
}
