//! Chat endpoints.

use axum::{extract::State, Json};

use super::{current_revision, error, respond, success, ApiResult};
use crate::auth::SessionUserId;
use crate::models::{MessageView, SendMessageRequest};
use crate::AppState;

/// GET /api/chat - List messages with senders, oldest first.
pub async fn list_messages(State(state): State<AppState>) -> ApiResult<Vec<MessageView>> {
    let revision_id = current_revision(&state).await;

    match state.dashboard.list_messages().await {
        Ok(messages) => success(messages, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// POST /api/chat - Send a message. Blank content yields `data: null`.
pub async fn send_message(
    State(state): State<AppState>,
    SessionUserId(user_id): SessionUserId,
    Json(request): Json<SendMessageRequest>,
) -> ApiResult<Option<MessageView>> {
    let revision_id = current_revision(&state).await;
    let result = state
        .dashboard
        .send_message(user_id.as_deref(), request)
        .await;
    respond(&state, revision_id, result).await
}
