//! Chat repository implementation

use sqlx::{PgConnection, PgPool};
use chrono::Utc;
use uuid::Uuid;
use crate::models::chat::{ChatMessage, ChatRoom, MessageType};
use crate::models::pagination::PageRequest;
use crate::utils::errors::TripBuddyError;

const MESSAGE_COLUMNS: &str = "id, room_id, sender_id, message_type, body, media_url, created_at";

#[derive(Clone, Debug)]
pub struct ChatRepository {
    pool: PgPool,
}

impl ChatRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_room_by_event(&self, event_id: Uuid) -> Result<Option<ChatRoom>, TripBuddyError> {
        let room = sqlx::query_as::<_, ChatRoom>(
            "SELECT id, event_id, created_at FROM chat_rooms WHERE event_id = $1"
        )
        .bind(event_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(room)
    }

    pub async fn insert_message(
        &self,
        room_id: i64,
        sender_id: Uuid,
        message_type: MessageType,
        body: Option<String>,
        media_url: Option<String>,
    ) -> Result<ChatMessage, TripBuddyError> {
        let message = sqlx::query_as::<_, ChatMessage>(&format!(
            r#"
            INSERT INTO chat_messages (room_id, sender_id, message_type, body, media_url, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {MESSAGE_COLUMNS}
            "#
        ))
        .bind(room_id)
        .bind(sender_id)
        .bind(message_type)
        .bind(body)
        .bind(media_url)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(message)
    }

    /// Messages of a room, oldest first
    pub async fn list_messages(&self, room_id: i64, page: PageRequest) -> Result<(Vec<ChatMessage>, i64), TripBuddyError> {
        let messages = sqlx::query_as::<_, ChatMessage>(&format!(
            r#"
            SELECT {MESSAGE_COLUMNS} FROM chat_messages
            WHERE room_id = $1
            ORDER BY created_at ASC, id ASC
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(room_id)
        .bind(i64::from(page.limit))
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM chat_messages WHERE room_id = $1")
            .bind(room_id)
            .fetch_one(&self.pool)
            .await?;

        Ok((messages, total.0))
    }
}

/// Write a membership system message into the event's room.
///
/// Runs on the caller's transaction; an event without a room inserts nothing.
pub(crate) async fn post_system_message(
    conn: &mut PgConnection,
    event_id: Uuid,
    subject_id: Option<Uuid>,
    message_type: MessageType,
) -> Result<(), TripBuddyError> {
    sqlx::query(
        r#"
        INSERT INTO chat_messages (room_id, sender_id, message_type, body, created_at)
        SELECT id, $2, $3, NULL, $4 FROM chat_rooms WHERE event_id = $1
        "#
    )
    .bind(event_id)
    .bind(subject_id)
    .bind(message_type)
    .bind(Utc::now())
    .execute(&mut *conn)
    .await?;

    Ok(())
}
