//! Joined read models exposed to the dashboard.
//!
//! Each view embeds the related record it references, or a placeholder when the
//! reference dangles.

use serde::{Deserialize, Serialize};

use super::{AccessLevel, Message, Task, User};

/// Compact staff reference embedded in tasks and messages.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StaffSummary {
    /// The referenced id, kept even when it no longer resolves.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub full_name: String,
    pub avatar_url: String,
    /// True when no staff record backs this summary.
    pub placeholder: bool,
}

impl From<&User> for StaffSummary {
    fn from(user: &User) -> Self {
        Self {
            id: Some(user.id.clone()),
            full_name: user.full_name.clone(),
            avatar_url: user.avatar_url.clone(),
            placeholder: false,
        }
    }
}

/// Role name and display color attached to a staff member.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoleBadge {
    pub name: String,
    pub color: String,
}

/// A staff member joined with their role.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StaffView {
    #[serde(flatten)]
    pub user: User,
    pub role_badge: RoleBadge,
}

/// A task joined with its assignee.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TaskView {
    #[serde(flatten)]
    pub task: Task,
    pub assignee: StaffSummary,
}

/// A chat message joined with its sender.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MessageView {
    #[serde(flatten)]
    pub message: Message,
    pub sender: StaffSummary,
}

/// What the dashboard keeps as its session after login.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionProfile {
    pub id: String,
    pub full_name: String,
    pub email: String,
    pub access_level: AccessLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_title: Option<String>,
    pub avatar_url: String,
}

impl From<User> for SessionProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            full_name: user.full_name,
            email: user.email,
            access_level: user.access_level,
            role: user.role,
            job_title: user.job_title,
            avatar_url: user.avatar_url,
        }
    }
}

/// Counters shown on the dashboard landing page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_staff: usize,
    /// Tasks whose status is anything other than Done
    pub active_tasks: usize,
    pub pending_reviews: usize,
}

/// Revision information for change detection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevisionInfo {
    pub revision_id: i64,
    pub generated_at: String,
}
