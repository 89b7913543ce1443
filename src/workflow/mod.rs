//! Task review state machine.
//!
//! ```text
//! Todo <-> In Progress
//!   |          |
//!   +--submit--+--> Review(pending) --approve--> Approved --complete--> Done
//!                     ^      |
//!                     |    reject
//!                  resubmit  v
//!                     +-- Rejected
//! ```
//!
//! Each function checks authorization first, then the current state, and returns
//! the updated task. The input task is never modified, so a failed transition
//! leaves the stored record untouched.

use url::Url;

use crate::authz::{authorize, Action};
use crate::errors::AppError;
use crate::models::{ProofStatus, ReviewDecision, Task, TaskStatus, User};

/// Assignee attaches a proof-of-work link and sends the task to review.
///
/// Re-submitting while already pending overwrites the stored link.
pub fn submit_proof(
    task: &Task,
    actor: &User,
    proof_url: &str,
    now: &str,
) -> Result<Task, AppError> {
    authorize(actor, Action::SubmitProof { task }).into_result()?;
    let proof_url = validate_proof_url(proof_url)?;

    match task.status {
        TaskStatus::Todo | TaskStatus::InProgress | TaskStatus::Rejected | TaskStatus::Review => {}
        TaskStatus::Approved | TaskStatus::Done => {
            return Err(AppError::InvalidTransition(format!(
                "Cannot submit proof for a task that is {}",
                task.status.as_str()
            )));
        }
    }

    let mut next = task.clone();
    next.status = TaskStatus::Review;
    next.proof_status = ProofStatus::Pending;
    next.proof_url = Some(proof_url);
    next.updated_at = now.to_string();
    Ok(next)
}

/// Manager approves or rejects a pending proof.
pub fn review(
    task: &Task,
    actor: &User,
    decision: ReviewDecision,
    now: &str,
) -> Result<Task, AppError> {
    authorize(actor, Action::ReviewProof).into_result()?;

    if task.proof_status != ProofStatus::Pending {
        return Err(AppError::InvalidTransition(format!(
            "Task has no pending proof (proof status is {})",
            task.proof_status.as_str()
        )));
    }

    let mut next = task.clone();
    match decision {
        ReviewDecision::Approved => {
            next.status = TaskStatus::Approved;
            next.proof_status = ProofStatus::Approved;
        }
        ReviewDecision::Rejected => {
            next.status = TaskStatus::Rejected;
            next.proof_status = ProofStatus::Rejected;
        }
    }
    next.updated_at = now.to_string();
    Ok(next)
}

/// Assignee marks an approved task as done.
pub fn complete(task: &Task, actor: &User, now: &str) -> Result<Task, AppError> {
    authorize(actor, Action::CompleteTask { task }).into_result()?;

    if task.status != TaskStatus::Approved {
        return Err(AppError::InvalidTransition(format!(
            "Only approved tasks can be completed (status is {})",
            task.status.as_str()
        )));
    }

    let mut next = task.clone();
    next.status = TaskStatus::Done;
    next.updated_at = now.to_string();
    Ok(next)
}

/// Assignee toggles between Todo and In Progress.
pub fn set_progress(
    task: &Task,
    actor: &User,
    status: TaskStatus,
    now: &str,
) -> Result<Task, AppError> {
    authorize(actor, Action::SetProgress { task }).into_result()?;

    let movable = |s: TaskStatus| matches!(s, TaskStatus::Todo | TaskStatus::InProgress);
    if !movable(task.status) || !movable(status) {
        return Err(AppError::InvalidTransition(format!(
            "Cannot move task from {} to {}",
            task.status.as_str(),
            status.as_str()
        )));
    }

    let mut next = task.clone();
    next.status = status;
    next.updated_at = now.to_string();
    Ok(next)
}

/// Accept `http://` or `https://` links with a non-empty host. Returns the trimmed link.
pub fn validate_proof_url(raw: &str) -> Result<String, AppError> {
    let link = raw.trim();
    if link.is_empty() {
        return Err(AppError::Validation("Proof link is required".to_string()));
    }

    let invalid = || {
        AppError::Validation(format!(
            "Proof link must be an http(s) URL with a host, got '{}'",
            link
        ))
    };

    let parsed = Url::parse(link).map_err(|_| invalid())?;
    let has_host = parsed.host_str().is_some_and(|h| !h.is_empty());
    if !matches!(parsed.scheme(), "http" | "https") || !has_host {
        return Err(invalid());
    }
    Ok(link.to_string())
}
