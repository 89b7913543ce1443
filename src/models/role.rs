//! Role model: a display name and color referenced by staff members.

use serde::{Deserialize, Serialize};

/// Color used when a role has none or cannot be resolved.
pub const DEFAULT_ROLE_COLOR: &str = "bg-gray-500";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Role {
    pub id: String,
    pub name: String,
    pub color: String,
}

/// Request body for creating a role.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateRoleRequest {
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
}
