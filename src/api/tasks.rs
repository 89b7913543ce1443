//! Task endpoints, including the proof-of-work review transitions.

use axum::{
    extract::{Path, Query, State},
    Json,
};

use super::{current_revision, error, respond, success, ApiResult};
use crate::auth::CurrentUser;
use crate::models::{
    CreateTaskRequest, ReviewRequest, SubmitProofRequest, TaskFilter, TaskView,
    UpdateStatusRequest,
};
use crate::AppState;

/// GET /api/tasks - List tasks with assignees, optionally filtered by `?status=`.
pub async fn list_tasks(
    State(state): State<AppState>,
    Query(filter): Query<TaskFilter>,
) -> ApiResult<Vec<TaskView>> {
    let revision_id = current_revision(&state).await;

    match state.dashboard.list_tasks(&filter).await {
        Ok(tasks) => success(tasks, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// GET /api/tasks/{id} - Get a single task.
pub async fn get_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<TaskView> {
    let revision_id = current_revision(&state).await;

    match state.dashboard.get_task(&id).await {
        Ok(task) => success(task, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// POST /api/tasks - Create and assign a task.
pub async fn create_task(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Json(request): Json<CreateTaskRequest>,
) -> ApiResult<TaskView> {
    let revision_id = current_revision(&state).await;
    let result = state.dashboard.create_task(&actor, request).await;
    respond(&state, revision_id, result).await
}

/// POST /api/tasks/{id}/proof - Submit a proof-of-work link.
pub async fn submit_proof(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(id): Path<String>,
    Json(request): Json<SubmitProofRequest>,
) -> ApiResult<TaskView> {
    let revision_id = current_revision(&state).await;
    let result = state
        .dashboard
        .submit_proof(&actor, &id, &request.proof_url)
        .await;
    respond(&state, revision_id, result).await
}

/// POST /api/tasks/{id}/review - Approve or reject the pending proof.
pub async fn review_task(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(id): Path<String>,
    Json(request): Json<ReviewRequest>,
) -> ApiResult<TaskView> {
    let revision_id = current_revision(&state).await;
    let result = state
        .dashboard
        .review_task(&actor, &id, request.decision)
        .await;
    respond(&state, revision_id, result).await
}

/// POST /api/tasks/{id}/complete - Mark an approved task as done.
pub async fn complete_task(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<TaskView> {
    let revision_id = current_revision(&state).await;
    let result = state.dashboard.complete_task(&actor, &id).await;
    respond(&state, revision_id, result).await
}

/// PUT /api/tasks/{id}/status - Toggle between Todo and In Progress.
pub async fn update_task_status(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(id): Path<String>,
    Json(request): Json<UpdateStatusRequest>,
) -> ApiResult<TaskView> {
    let revision_id = current_revision(&state).await;
    let result = state
        .dashboard
        .set_task_progress(&actor, &id, request.status)
        .await;
    respond(&state, revision_id, result).await
}
