//! Event chat tests against Postgres

mod helpers;

use helpers::*;
use serial_test::serial;
use tripbuddy::models::{EventType, JoinEventRequest, MessageType, PageRequest, SendMessageRequest};
use tripbuddy::ErrorKind;

#[tokio::test]
#[serial]
async fn test_chat_is_gated_on_confirmed_membership() {
    let Some(ctx) = TestContext::new().await else { return };
    let chat = &ctx.services.chat_service;
    let creator = create_test_user(ctx.db()).await;
    let user = create_test_user(ctx.db()).await;
    let event = ctx.services.event_service.create(creator.id, event_request(EventType::Meal)).await.unwrap();

    assert_eq!(chat.get_room(user.id, event.id).await.unwrap_err().kind(), ErrorKind::Forbidden);

    ctx.services.membership_service.join(user.id, event.id, JoinEventRequest::default()).await.unwrap();
    let pending = chat.send_message(user.id, event.id, SendMessageRequest::text("hello?")).await.unwrap_err();
    assert_eq!(pending.kind(), ErrorKind::Forbidden);

    ctx.services.membership_service.confirm(user.id, event.id).await.unwrap();
    let room = chat.get_room(user.id, event.id).await.unwrap();
    assert_eq!(room.event_id, event.id);

    let sent = chat.send_message(user.id, event.id, SendMessageRequest::text(" see you there ")).await.unwrap();
    assert_eq!(sent.body.as_deref(), Some("see you there"));
    assert_eq!(sent.sender_id, Some(user.id));
}

#[tokio::test]
#[serial]
async fn test_membership_changes_post_system_messages() {
    let Some(ctx) = TestContext::new().await else { return };
    let chat = &ctx.services.chat_service;
    let membership = &ctx.services.membership_service;
    let creator = create_test_user(ctx.db()).await;
    let confirmed = create_test_user(ctx.db()).await;
    let pending = create_test_user(ctx.db()).await;
    let event = ctx.services.event_service.create(creator.id, event_request(EventType::Meal)).await.unwrap();

    membership.join(confirmed.id, event.id, JoinEventRequest::default()).await.unwrap();
    membership.confirm(confirmed.id, event.id).await.unwrap();
    chat.send_message(creator.id, event.id, SendMessageRequest::text("welcome")).await.unwrap();
    membership.leave(confirmed.id, event.id).await.unwrap();

    // Leaving from pending is silent
    membership.join(pending.id, event.id, JoinEventRequest::default()).await.unwrap();
    membership.leave(pending.id, event.id).await.unwrap();

    let page = chat.list_messages(creator.id, event.id, PageRequest::new(1, 50)).await.unwrap();
    let types: Vec<MessageType> = page.items.iter().map(|m| m.message_type).collect();
    assert_eq!(types, vec![MessageType::Confirm, MessageType::Text, MessageType::Leave]);
    assert_eq!(page.items[0].sender_id, Some(confirmed.id));
    assert_eq!(page.total, 3);

    // The member who left can no longer read the room
    let err = chat.list_messages(confirmed.id, event.id, PageRequest::new(1, 50)).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Forbidden);
}

#[tokio::test]
#[serial]
async fn test_invalid_messages_are_rejected() {
    let Some(ctx) = TestContext::new().await else { return };
    let chat = &ctx.services.chat_service;
    let creator = create_test_user(ctx.db()).await;
    let event = ctx.services.event_service.create(creator.id, event_request(EventType::Meal)).await.unwrap();

    let empty = chat.send_message(creator.id, event.id, SendMessageRequest::text("   ")).await.unwrap_err();
    assert_eq!(empty.kind(), ErrorKind::Validation);

    let system = SendMessageRequest {
        message_type: MessageType::System,
        body: Some("spoofed".to_string()),
        media_url: None,
    };
    assert_eq!(chat.send_message(creator.id, event.id, system).await.unwrap_err().kind(), ErrorKind::Validation);

    let image = SendMessageRequest {
        message_type: MessageType::Image,
        body: None,
        media_url: Some("https://cdn.example.com/menu.jpg".to_string()),
    };
    let sent = chat.send_message(creator.id, event.id, image).await.unwrap();
    assert_eq!(sent.message_type, MessageType::Image);
}
