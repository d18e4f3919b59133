//! Conversation types

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// One entry of a conversation, in the shape the upstream endpoint expects
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub content: String,
    pub role: Role,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Message {
    /// User messages carry the conversation id as their own id.
    pub fn user(conversation_id: &str, content: &str) -> Self {
        Self {
            id: conversation_id.to_string(),
            content: content.to_string(),
            role: Role::User,
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            id: format!("response-{}", Utc::now().timestamp_millis()),
            content: content.into(),
            role: Role::Assistant,
        }
    }
}
