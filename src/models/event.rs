//! Event model

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;
use super::tag::Tag;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Meal,
    #[serde(alias = "daytrip")]
    OneDayTrip,
    Overnight,
    Activity,
    Other,
}

text_enum!(EventType, "event type" {
    Meal => "meal",
    OneDayTrip => "one_day_trip" | "daytrip",
    Overnight => "overnight",
    Activity => "activity",
    Other => "other",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    Draft,
    Published,
    Cancelled,
    Completed,
}

text_enum!(EventStatus, "event status" {
    Draft => "draft",
    Published => "published",
    Cancelled => "cancelled",
    Completed => "completed",
});

impl EventStatus {
    /// Whether an owner update may move the event from `self` to `next`.
    /// `completed` is only reachable through the explicit complete action.
    pub fn can_update_to(&self, next: EventStatus) -> bool {
        use EventStatus::*;
        match (self, next) {
            (current, next) if *current == next => true,
            (Draft, Published) | (Draft, Cancelled) => true,
            (Published, Cancelled) => true,
            (Cancelled, Published) => true,
            _ => false,
        }
    }

    pub fn can_complete(&self) -> bool {
        matches!(self, EventStatus::Published)
    }

    pub fn accepts_members(&self) -> bool {
        matches!(self, EventStatus::Published)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Event {
    pub id: Uuid,
    pub creator_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub event_type: EventType,
    pub location_name: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub start_at: Option<DateTime<Utc>>,
    pub end_at: Option<DateTime<Utc>>,
    pub max_participants: Option<i32>,
    pub budget_min: Option<i32>,
    pub budget_max: Option<i32>,
    pub status: EventStatus,
    pub cover_image_url: Option<String>,
    pub photo_urls: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    /// Timestamp used to order events by recency
    pub fn recency_key(&self) -> DateTime<Utc> {
        self.start_at.unwrap_or(self.created_at)
    }

    pub fn is_creator(&self, user_id: Uuid) -> bool {
        self.creator_id == user_id
    }
}

/// Event together with its tags and current confirmed head count
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventDetails {
    pub event: Event,
    pub tags: Vec<Tag>,
    pub confirmed_count: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventFilter {
    pub event_type: Option<EventType>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEventRequest {
    pub title: String,
    pub description: Option<String>,
    pub event_type: EventType,
    pub location_name: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub start_at: Option<DateTime<Utc>>,
    pub end_at: Option<DateTime<Utc>>,
    pub max_participants: Option<i32>,
    pub budget_min: Option<i32>,
    pub budget_max: Option<i32>,
    /// `draft` or `published`; defaults to `published`
    pub status: Option<EventStatus>,
    #[serde(default)]
    pub category_ids: Vec<i64>,
    #[serde(default)]
    pub tag_ids: Vec<i64>,
    pub cover_image_url: Option<String>,
    #[serde(default)]
    pub photo_urls: Vec<String>,
}

impl CreateEventRequest {
    pub fn new(title: impl Into<String>, event_type: EventType) -> Self {
        Self {
            title: title.into(),
            description: None,
            event_type,
            location_name: None,
            latitude: None,
            longitude: None,
            start_at: None,
            end_at: None,
            max_participants: None,
            budget_min: None,
            budget_max: None,
            status: None,
            category_ids: Vec::new(),
            tag_ids: Vec::new(),
            cover_image_url: None,
            photo_urls: Vec::new(),
        }
    }
}

/// Partial update. Absent (or null) fields keep their stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateEventRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub event_type: Option<EventType>,
    pub location_name: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub start_at: Option<DateTime<Utc>>,
    pub end_at: Option<DateTime<Utc>>,
    pub max_participants: Option<i32>,
    pub budget_min: Option<i32>,
    pub budget_max: Option<i32>,
    pub status: Option<EventStatus>,
    /// Replaces the category set when present
    pub category_ids: Option<Vec<i64>>,
    /// Replaces the free tag set when present
    pub tag_ids: Option<Vec<i64>>,
    pub cover_image_url: Option<String>,
}
