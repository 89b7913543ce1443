//! Chat message model.

use serde::{Deserialize, Serialize};

/// The single implicit chat channel.
pub const GENERAL_CHANNEL: &str = "general";

/// A chat message. Append-only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub content: String,
    pub sender_id: String,
    pub channel_id: String,
    pub created_at: String,
}

/// Request body for `POST /api/chat`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    pub content: String,
    #[serde(default)]
    pub channel_id: Option<String>,
}
