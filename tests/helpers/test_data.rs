//! Test data helpers for creating users, events and collaborators

use async_trait::async_trait;
use chrono::{Duration, Utc};
use fake::faker::internet::en::Username;
use fake::faker::lorem::en::Sentence;
use fake::faker::name::en::Name;
use fake::Fake;
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;
use tripbuddy::database::DatabaseService;
use tripbuddy::models::{CreateEventRequest, CreateUserRequest, EventType, TagKind, User};
use tripbuddy::services::{ObjectStorage, StoredObject};
use tripbuddy::utils::errors::Result;

/// Insert a user with a random, unique username
pub async fn create_test_user(db: &DatabaseService) -> User {
    let username: String = Username().fake();
    let display_name: String = Name().fake();
    let suffix = Uuid::new_v4().simple().to_string();

    db.users
        .create(CreateUserRequest {
            id: None,
            username: format!("{}_{}", username, &suffix[..8]),
            display_name: Some(display_name),
        })
        .await
        .expect("Failed to create test user")
}

/// A published event starting tomorrow
pub fn event_request(event_type: EventType) -> CreateEventRequest {
    let title: String = Sentence(2..5).fake();
    let mut request = CreateEventRequest::new(title.chars().take(100).collect::<String>(), event_type);
    request.start_at = Some(Utc::now() + Duration::days(1));
    request.end_at = Some(Utc::now() + Duration::days(1) + Duration::hours(4));
    request
}

pub fn event_request_with_capacity(capacity: i32) -> CreateEventRequest {
    let mut request = event_request(EventType::Meal);
    request.max_participants = Some(capacity);
    request
}

/// Id of a seeded taxonomy entry
pub async fn seeded_tag_id(db: &DatabaseService, kind: TagKind, code: &str) -> i64 {
    db.tags
        .find_active_by_code(kind, code)
        .await
        .expect("Failed to look up tag")
        .unwrap_or_else(|| panic!("seeded tag {}/{} missing", kind, code))
        .id
}

/// Object storage kept in memory
#[derive(Debug, Default)]
pub struct MemoryStorage {
    objects: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryStorage {
    pub fn contains(&self, key: &str) -> bool {
        self.objects.lock().unwrap().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.objects.lock().unwrap().len()
    }
}

#[async_trait]
impl ObjectStorage for MemoryStorage {
    async fn put(&self, key: &str, _content_type: &str, bytes: Vec<u8>) -> Result<StoredObject> {
        let size = bytes.len();
        self.objects.lock().unwrap().insert(key.to_string(), bytes);
        Ok(StoredObject {
            key: key.to_string(),
            url: self.public_url(key),
            size,
        })
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.objects.lock().unwrap().remove(key);
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("https://cdn.test/{}", key)
    }

    fn key_for_url(&self, url: &str) -> Option<String> {
        url.strip_prefix("https://cdn.test/").map(str::to_string)
    }
}
