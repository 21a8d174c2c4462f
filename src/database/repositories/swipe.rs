//! Swipe repository implementation

use sqlx::PgPool;
use chrono::Utc;
use uuid::Uuid;
use crate::models::swipe::{EventSwipe, SwipeDirection};
use crate::utils::errors::TripBuddyError;

#[derive(Clone, Debug)]
pub struct SwipeRepository {
    pool: PgPool,
}

impl SwipeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Record a swipe; a repeat swipe replaces direction and timestamp
    pub async fn upsert(&self, user_id: Uuid, event_id: Uuid, direction: SwipeDirection) -> Result<EventSwipe, TripBuddyError> {
        let swipe = sqlx::query_as::<_, EventSwipe>(
            r#"
            INSERT INTO event_swipes (user_id, event_id, direction, created_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id, event_id) DO UPDATE
                SET direction = EXCLUDED.direction,
                    created_at = EXCLUDED.created_at
            RETURNING user_id, event_id, direction, created_at
            "#
        )
        .bind(user_id)
        .bind(event_id)
        .bind(direction)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(swipe)
    }

    /// Swipes on live events, most recent first
    pub async fn list_by_user(&self, user_id: Uuid, direction: Option<SwipeDirection>) -> Result<Vec<EventSwipe>, TripBuddyError> {
        let swipes = sqlx::query_as::<_, EventSwipe>(
            r#"
            SELECT s.user_id, s.event_id, s.direction, s.created_at
            FROM event_swipes s
            INNER JOIN live_events e ON e.id = s.event_id
            WHERE s.user_id = $1 AND ($2::TEXT IS NULL OR s.direction = $2)
            ORDER BY s.created_at DESC, s.event_id ASC
            "#
        )
        .bind(user_id)
        .bind(direction)
        .fetch_all(&self.pool)
        .await?;

        Ok(swipes)
    }
}
