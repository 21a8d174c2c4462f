//! Chat room and message models

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    Text,
    Image,
    File,
    System,
    Join,
    Leave,
    Confirm,
}

text_enum!(MessageType, "message type" {
    Text => "text",
    Image => "image",
    File => "file",
    System => "system",
    Join => "join",
    Leave => "leave",
    Confirm => "confirm",
});

impl MessageType {
    /// System rows are written by the core, never submitted by users
    pub fn is_user_sendable(&self) -> bool {
        matches!(self, MessageType::Text | MessageType::Image | MessageType::File)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ChatRoom {
    pub id: i64,
    pub event_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ChatMessage {
    pub id: i64,
    pub room_id: i64,
    pub sender_id: Option<Uuid>,
    pub message_type: MessageType,
    pub body: Option<String>,
    pub media_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendMessageRequest {
    pub message_type: MessageType,
    pub body: Option<String>,
    pub media_url: Option<String>,
}

impl SendMessageRequest {
    pub fn text(body: impl Into<String>) -> Self {
        Self {
            message_type: MessageType::Text,
            body: Some(body.into()),
            media_url: None,
        }
    }
}
