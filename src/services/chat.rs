//! Event chat service
//!
//! Each event has one room. Only confirmed members may read or post.

use tracing::debug;
use uuid::Uuid;
use crate::config::Settings;
use crate::database::DatabaseService;
use crate::models::chat::{ChatMessage, ChatRoom, MessageType, SendMessageRequest};
use crate::models::member::MemberStatus;
use crate::models::pagination::{Page, PageRequest};
use crate::utils::errors::{Result, TripBuddyError};
use crate::utils::helpers::is_http_url;

/// Check a user-submitted message; returns the normalized body
pub fn validate_message(request: &SendMessageRequest, max_length: usize) -> Result<Option<String>> {
    if !request.message_type.is_user_sendable() {
        return Err(TripBuddyError::invalid(format!(
            "{} messages cannot be sent by users",
            request.message_type
        )));
    }

    let body = request
        .body
        .as_deref()
        .map(str::trim)
        .filter(|body| !body.is_empty())
        .map(str::to_string);

    if let Some(text) = body.as_deref() {
        if text.chars().count() > max_length {
            return Err(TripBuddyError::invalid(format!("message must be at most {} characters", max_length)));
        }
    }

    match request.message_type {
        MessageType::Text if body.is_none() => Err(TripBuddyError::invalid("text message must not be empty")),
        MessageType::Image | MessageType::File => match request.media_url.as_deref() {
            Some(url) if is_http_url(url) => Ok(body),
            _ => Err(TripBuddyError::invalid("media messages need a valid media url")),
        },
        _ => Ok(body),
    }
}

#[derive(Clone, Debug)]
pub struct ChatService {
    db: DatabaseService,
    settings: Settings,
}

impl ChatService {
    pub fn new(db: DatabaseService, settings: Settings) -> Self {
        Self { db, settings }
    }

    /// Resolve the room of a live event the user is confirmed in
    async fn room_for_confirmed(&self, user_id: Uuid, event_id: Uuid) -> Result<ChatRoom> {
        if self.db.events.find_live(event_id).await?.is_none() {
            return Err(TripBuddyError::EventNotFound { event_id });
        }

        let confirmed = self
            .db
            .members
            .find(event_id, user_id)
            .await?
            .map_or(false, |member| member.status == MemberStatus::Confirmed);
        if !confirmed {
            return Err(TripBuddyError::forbidden("chat is open to confirmed members only"));
        }

        self.db
            .chats
            .find_room_by_event(event_id)
            .await?
            .ok_or(TripBuddyError::ChatRoomNotFound { event_id })
    }

    pub async fn get_room(&self, user_id: Uuid, event_id: Uuid) -> Result<ChatRoom> {
        self.room_for_confirmed(user_id, event_id).await
    }

    pub async fn send_message(&self, user_id: Uuid, event_id: Uuid, request: SendMessageRequest) -> Result<ChatMessage> {
        let body = validate_message(&request, self.settings.events.max_message_length)?;
        let room = self.room_for_confirmed(user_id, event_id).await?;

        let message = self
            .db
            .chats
            .insert_message(room.id, user_id, request.message_type, body, request.media_url)
            .await?;

        debug!(room_id = room.id, message_id = message.id, user_id = %user_id, "Chat message sent");
        Ok(message)
    }

    /// Messages oldest first
    pub async fn list_messages(&self, user_id: Uuid, event_id: Uuid, page: PageRequest) -> Result<Page<ChatMessage>> {
        page.validate(self.settings.matching.max_page_size)?;
        let room = self.room_for_confirmed(user_id, event_id).await?;

        let (messages, total) = self.db.chats.list_messages(room.id, page).await?;
        Ok(Page::new(messages, total, page))
    }
}
