//! Tag and preference taxonomy models

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Lowest food preference level
pub const PREFERENCE_LEVEL_MIN: i16 = 1;
/// Highest food preference level
pub const PREFERENCE_LEVEL_MAX: i16 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagKind {
    Interest,
    Food,
    TravelStyle,
    Category,
    Generic,
}

text_enum!(TagKind, "tag kind" {
    Interest => "interest",
    Food => "food",
    TravelStyle => "travel_style",
    Category => "category",
    Generic => "generic",
});

impl TagKind {
    /// Food preferences carry a 1..=3 strength; other kinds are plain selections
    pub fn has_levels(&self) -> bool {
        matches!(self, TagKind::Food)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Tag {
    pub id: i64,
    pub kind: TagKind,
    pub code: String,
    pub name: String,
    pub icon: Option<String>,
    pub sort_order: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// A user's selection of a tag, with the tag's vocabulary data
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserTag {
    pub user_id: Uuid,
    pub tag_id: i64,
    pub kind: TagKind,
    pub code: String,
    pub name: String,
    pub level: i16,
    pub updated_at: DateTime<Utc>,
}

/// Tag attached to an event, as loaded in batches for scoring
#[derive(Debug, Clone, FromRow)]
pub struct EventTagRow {
    pub event_id: Uuid,
    #[sqlx(flatten)]
    pub tag: Tag,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTagRequest {
    pub kind: TagKind,
    pub code: String,
    pub name: String,
    pub icon: Option<String>,
    #[serde(default)]
    pub sort_order: i32,
}
