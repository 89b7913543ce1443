//! Session identity and credential checks.
//!
//! The dashboard keeps the logged-in user's id client-side and sends it on every
//! request in the `x-staffnet-user` header. Handlers that act on behalf of a user
//! take a [`CurrentUser`], which resolves that id against the staff directory.

use std::convert::Infallible;

use axum::{extract::FromRequestParts, http::request::Parts};
use subtle::ConstantTimeEq;

use crate::errors::{AppError, AppErrorWithRevision};
use crate::models::User;
use crate::AppState;

/// Header carrying the session user id.
pub const SESSION_HEADER: &str = "x-staffnet-user";

/// Check a provided password against the stored one.
pub fn verify_password(provided: &str, stored: &str) -> bool {
    constant_time_compare(provided, stored)
}

/// Perform constant-time string comparison.
fn constant_time_compare(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

fn session_header(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// The acting user. Rejects with 401 when the header is missing or the user is gone.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppErrorWithRevision;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let result = match session_header(parts) {
            Some(user_id) => state.dashboard.resolve_actor(&user_id).await,
            None => Err(AppError::Unauthorized(format!(
                "Missing {} header",
                SESSION_HEADER
            ))),
        };

        match result {
            Ok(user) => Ok(CurrentUser(user)),
            Err(error) => {
                tracing::debug!("Rejected session: {}", error);
                Err(AppErrorWithRevision {
                    error,
                    revision_id: state.dashboard.revision_id().await.unwrap_or(0),
                })
            }
        }
    }
}

/// The session user id, if the request carries one. Never rejects.
#[derive(Debug, Clone)]
pub struct SessionUserId(pub Option<String>);

impl<S: Send + Sync> FromRequestParts<S> for SessionUserId {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(SessionUserId(session_header(parts)))
    }
}
