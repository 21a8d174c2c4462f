//! Swipe model

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwipeDirection {
    Like,
    Pass,
}

text_enum!(SwipeDirection, "swipe direction" {
    Like => "like",
    Pass => "pass",
});

/// One row per (user, event); a repeat swipe overwrites it
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EventSwipe {
    pub user_id: Uuid,
    pub event_id: Uuid,
    pub direction: SwipeDirection,
    pub created_at: DateTime<Utc>,
}
