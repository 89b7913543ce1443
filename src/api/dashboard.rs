//! Dashboard-wide endpoints: counters, revision, audit trail and seeding.

use axum::extract::State;

use super::{current_revision, error, respond, success, ApiResult};
use crate::auth::CurrentUser;
use crate::errors::AppError;
use crate::models::{AuditLog, DashboardStats, RevisionInfo};
use crate::AppState;

/// GET /api/stats - Staff, active task and pending review counts.
pub async fn get_stats(State(state): State<AppState>) -> ApiResult<DashboardStats> {
    let revision_id = current_revision(&state).await;

    match state.dashboard.stats().await {
        Ok(stats) => success(stats, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// GET /api/revision - Get current revision info (for polling).
pub async fn get_revision(State(state): State<AppState>) -> ApiResult<RevisionInfo> {
    match state.dashboard.revision_info().await {
        Ok(info) => {
            let revision_id = info.revision_id;
            success(info, revision_id)
        }
        Err(e) => error(e, 0),
    }
}

/// GET /api/audit-logs - Audit trail, newest first.
pub async fn list_audit_logs(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
) -> ApiResult<Vec<AuditLog>> {
    let revision_id = current_revision(&state).await;

    match state.dashboard.list_audit_logs(&actor).await {
        Ok(logs) => success(logs, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// GET /api/seed - Wipe the database and recreate the defaults.
pub async fn seed(State(state): State<AppState>) -> ApiResult<String> {
    let revision_id = current_revision(&state).await;

    if !state.config.allow_seed {
        tracing::warn!("Seed requested while disabled");
        return error(
            AppError::Forbidden("Seeding is disabled".to_string()),
            revision_id,
        );
    }

    let result = state
        .dashboard
        .seed()
        .await
        .map(|_| "Database seeded".to_string());
    respond(&state, revision_id, result).await
}
