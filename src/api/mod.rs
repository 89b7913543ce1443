//! REST API module.
//!
//! Handlers translate HTTP into dashboard calls and wrap every result in the
//! `{ success, data, revisionId }` envelope.

mod chat;
mod dashboard;
mod events;
mod session;
mod staff;
mod tasks;

pub use chat::*;
pub use dashboard::*;
pub use events::*;
pub use session::*;
pub use staff::*;
pub use tasks::*;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::errors::{AppError, AppErrorWithRevision};
use crate::AppState;

/// Success response envelope.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
    pub revision_id: i64,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(data: T, revision_id: i64) -> Self {
        Self {
            success: true,
            data,
            revision_id,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Response type that can be either success or error.
pub type ApiResult<T> = Result<ApiResponse<T>, AppErrorWithRevision>;

/// Create a successful API response.
pub fn success<T: Serialize>(data: T, revision_id: i64) -> ApiResult<T> {
    Ok(ApiResponse::new(data, revision_id))
}

/// Create an error API response.
pub fn error<T: Serialize>(err: AppError, revision_id: i64) -> ApiResult<T> {
    Err(AppErrorWithRevision {
        error: err,
        revision_id,
    })
}

/// Current revision, or 0 when the store cannot be read.
async fn current_revision(state: &AppState) -> i64 {
    state.dashboard.revision_id().await.unwrap_or(0)
}

/// Envelope a mutation result, reporting the revision it produced.
async fn respond<T: Serialize>(
    state: &AppState,
    revision_id: i64,
    result: Result<T, AppError>,
) -> ApiResult<T> {
    match result {
        Ok(data) => {
            let new_revision = state.dashboard.revision_id().await.unwrap_or(revision_id);
            success(data, new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}
