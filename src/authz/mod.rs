//! Authorization checks.
//!
//! Every mutating operation asks [`authorize`] before touching the store.

use crate::errors::AppError;
use crate::models::{AccessLevel, Task, User};

/// A privileged operation an actor wants to perform.
#[derive(Debug, Clone, Copy)]
pub enum Action<'a> {
    CreateStaff,
    UpdateStaff,
    FireStaff { target_id: &'a str },
    CreateRole,
    CreateTask,
    SubmitProof { task: &'a Task },
    ReviewProof,
    CompleteTask { task: &'a Task },
    SetProgress { task: &'a Task },
    ViewAuditLog,
}

/// Outcome of an authorization check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(String),
}

impl Decision {
    /// Convert a denial into a `Forbidden` error.
    pub fn into_result(self) -> Result<(), AppError> {
        match self {
            Decision::Allow => Ok(()),
            Decision::Deny(reason) => Err(AppError::Forbidden(reason)),
        }
    }
}

/// Decide whether `actor` may perform `action`.
pub fn authorize(actor: &User, action: Action<'_>) -> Decision {
    let level = actor.access_level;
    match action {
        Action::CreateStaff | Action::UpdateStaff | Action::CreateRole | Action::ViewAuditLog => {
            if level == AccessLevel::Admin {
                Decision::Allow
            } else {
                Decision::Deny("Only admins can manage staff and roles".to_string())
            }
        }
        Action::FireStaff { target_id } => {
            if level != AccessLevel::Admin {
                Decision::Deny("Only admins can manage staff and roles".to_string())
            } else if target_id == actor.id {
                Decision::Deny("You cannot fire yourself".to_string())
            } else {
                Decision::Allow
            }
        }
        Action::CreateTask => {
            if level.can_manage() {
                Decision::Allow
            } else {
                Decision::Deny("Only managers can create tasks".to_string())
            }
        }
        Action::ReviewProof => {
            if level.can_manage() {
                Decision::Allow
            } else {
                Decision::Deny("Only managers can review tasks".to_string())
            }
        }
        Action::SubmitProof { task } => assignee_only(
            actor,
            task,
            "You can only submit proof for your own task",
        ),
        Action::CompleteTask { task } => {
            assignee_only(actor, task, "You can only complete your own task")
        }
        Action::SetProgress { task } => {
            assignee_only(actor, task, "You can only update the status of your own task")
        }
    }
}

fn assignee_only(actor: &User, task: &Task, reason: &str) -> Decision {
    if task.assigned_to.as_deref() == Some(actor.id.as_str()) {
        Decision::Allow
    } else {
        Decision::Deny(reason.to_string())
    }
}
