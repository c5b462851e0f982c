use serde::{Deserialize, Serialize};

/// One wire-format message for the chat-completions endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

/// A persisted row of the coach conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoachMessage {
    pub id: i64,
    pub user_id: String,
    pub role: String,
    pub content: String,
    pub created_at: i64,
}
