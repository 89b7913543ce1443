//! Login endpoint.

use axum::{extract::State, Json};

use super::{current_revision, error, success, ApiResult};
use crate::models::{LoginRequest, SessionProfile};
use crate::AppState;

/// POST /api/login - Exchange credentials for the session profile.
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<SessionProfile> {
    let revision_id = current_revision(&state).await;

    match state.dashboard.login(&request).await {
        Ok(profile) => success(profile, revision_id),
        Err(e) => error(e, revision_id),
    }
}
