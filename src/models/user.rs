//! Staff member model and the requests that create or change one.

use serde::{Deserialize, Serialize};

/// Coarse role label gating privileged actions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum AccessLevel {
    Admin,
    Manager,
    #[default]
    Staff,
}

impl AccessLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessLevel::Admin => "Admin",
            AccessLevel::Manager => "Manager",
            AccessLevel::Staff => "Staff",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Admin" => Some(AccessLevel::Admin),
            "Manager" => Some(AccessLevel::Manager),
            "Staff" => Some(AccessLevel::Staff),
            _ => None,
        }
    }

    /// Admins and managers may review proofs and create tasks.
    pub fn can_manage(&self) -> bool {
        matches!(self, AccessLevel::Admin | AccessLevel::Manager)
    }
}

/// A staff member. The password is kept in plaintext and never serialized.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub full_name: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password: String,
    pub access_level: AccessLevel,
    /// Role label, matched against `Role::name`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_title: Option<String>,
    pub avatar_url: String,
    pub status: String,
    pub created_at: String,
}

/// Request body for `POST /api/login`.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Request body for creating a staff member.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub full_name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub access_level: Option<AccessLevel>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub job_title: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

/// Request body for updating a staff member. Absent fields are left alone.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub access_level: Option<AccessLevel>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub job_title: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}
