//! Event repository implementation
//!
//! Reads go through the `live_events` view, writes lock the row with the
//! `is_deleted` predicate in [`lock_live`]; tombstoned events are never
//! visible to callers.

use sqlx::{PgConnection, PgPool};
use chrono::{DateTime, Utc};
use uuid::Uuid;
use crate::models::event::{Event, EventFilter, EventStatus, CreateEventRequest, UpdateEventRequest};
use crate::models::member::{MemberRole, MemberStatus};
use crate::models::tag::{EventTagRow, Tag};
use crate::models::pagination::PageRequest;
use crate::utils::errors::TripBuddyError;

const EVENT_COLUMNS: &str = "id, creator_id, title, description, event_type, location_name, latitude, longitude, \
     start_at, end_at, max_participants, budget_min, budget_max, status, cover_image_url, photo_urls, \
     created_at, updated_at";

#[derive(Clone, Debug)]
pub struct EventRepository {
    pool: PgPool,
}

impl EventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create an event with its creator membership, tags and chat room in one transaction
    pub async fn create(&self, creator_id: Uuid, request: CreateEventRequest, tag_ids: &[i64]) -> Result<Event, TripBuddyError> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let event = sqlx::query_as::<_, Event>(&format!(
            r#"
            INSERT INTO events (id, creator_id, title, description, event_type, location_name, latitude, longitude,
                                start_at, end_at, max_participants, budget_min, budget_max, status,
                                cover_image_url, photo_urls, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $17)
            RETURNING {EVENT_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(creator_id)
        .bind(request.title)
        .bind(request.description)
        .bind(request.event_type)
        .bind(request.location_name)
        .bind(request.latitude)
        .bind(request.longitude)
        .bind(request.start_at)
        .bind(request.end_at)
        .bind(request.max_participants)
        .bind(request.budget_min)
        .bind(request.budget_max)
        .bind(request.status.unwrap_or(EventStatus::Published))
        .bind(request.cover_image_url)
        .bind(request.photo_urls)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO event_members (event_id, user_id, role, status, joined_at, confirmed_at)
            VALUES ($1, $2, $3, $4, $5, $5)
            "#
        )
        .bind(event.id)
        .bind(creator_id)
        .bind(MemberRole::Creator)
        .bind(MemberStatus::Confirmed)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        replace_tags(&mut tx, event.id, tag_ids).await?;

        sqlx::query("INSERT INTO chat_rooms (event_id, created_at) VALUES ($1, $2)")
            .bind(event.id)
            .bind(now)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(event)
    }

    /// Find a live (not deleted) event by ID
    pub async fn find_live(&self, id: Uuid) -> Result<Option<Event>, TripBuddyError> {
        let event = sqlx::query_as::<_, Event>(&format!(
            "SELECT {EVENT_COLUMNS} FROM live_events WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(event)
    }

    /// Apply a partial update; status moves and capacity are checked under the row lock
    pub async fn update(&self, id: Uuid, request: UpdateEventRequest, tag_ids: Option<Vec<i64>>) -> Result<Event, TripBuddyError> {
        let mut tx = self.pool.begin().await?;

        let current = lock_live(&mut tx, id)
            .await?
            .ok_or(TripBuddyError::EventNotFound { event_id: id })?;

        if let Some(next) = request.status {
            if !current.status.can_update_to(next) {
                return Err(TripBuddyError::InvalidStateTransition {
                    from: current.status.to_string(),
                    to: next.to_string(),
                });
            }
        }

        if let Some(capacity) = request.max_participants {
            let confirmed = count_confirmed(&mut tx, id).await?;
            if i64::from(capacity) < confirmed {
                return Err(TripBuddyError::CapacityBelowConfirmed { event_id: id, capacity, confirmed });
            }
        }

        let event = sqlx::query_as::<_, Event>(&format!(
            r#"
            UPDATE events
            SET title = COALESCE($2, title),
                description = COALESCE($3, description),
                event_type = COALESCE($4, event_type),
                location_name = COALESCE($5, location_name),
                latitude = COALESCE($6, latitude),
                longitude = COALESCE($7, longitude),
                start_at = COALESCE($8, start_at),
                end_at = COALESCE($9, end_at),
                max_participants = COALESCE($10, max_participants),
                budget_min = COALESCE($11, budget_min),
                budget_max = COALESCE($12, budget_max),
                status = COALESCE($13, status),
                cover_image_url = COALESCE($14, cover_image_url),
                updated_at = $15
            WHERE id = $1
            RETURNING {EVENT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(request.title)
        .bind(request.description)
        .bind(request.event_type)
        .bind(request.location_name)
        .bind(request.latitude)
        .bind(request.longitude)
        .bind(request.start_at)
        .bind(request.end_at)
        .bind(request.max_participants)
        .bind(request.budget_min)
        .bind(request.budget_max)
        .bind(request.status)
        .bind(request.cover_image_url)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await?;

        if let Some(tag_ids) = tag_ids {
            replace_tags(&mut tx, id, &tag_ids).await?;
        }

        tx.commit().await?;
        Ok(event)
    }

    /// Tombstone an event. Returns false when it was already gone.
    pub async fn soft_delete(&self, id: Uuid) -> Result<bool, TripBuddyError> {
        let now = Utc::now();
        let result = sqlx::query(
            "UPDATE events SET is_deleted = TRUE, deleted_at = $2, updated_at = $2 WHERE id = $1 AND NOT is_deleted"
        )
        .bind(id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Move a published event to its terminal `completed` status
    pub async fn complete(&self, id: Uuid) -> Result<Event, TripBuddyError> {
        let mut tx = self.pool.begin().await?;

        let current = lock_live(&mut tx, id)
            .await?
            .ok_or(TripBuddyError::EventNotFound { event_id: id })?;

        if !current.status.can_complete() {
            return Err(TripBuddyError::InvalidStateTransition {
                from: current.status.to_string(),
                to: EventStatus::Completed.to_string(),
            });
        }

        let event = sqlx::query_as::<_, Event>(&format!(
            "UPDATE events SET status = $2, updated_at = $3 WHERE id = $1 RETURNING {EVENT_COLUMNS}"
        ))
        .bind(id)
        .bind(EventStatus::Completed)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(event)
    }

    /// List published events, newest first
    pub async fn list_published(&self, filter: &EventFilter, page: PageRequest) -> Result<(Vec<Event>, i64), TripBuddyError> {
        let events = sqlx::query_as::<_, Event>(&format!(
            r#"
            SELECT {EVENT_COLUMNS} FROM live_events
            WHERE status = 'published' AND ($1::TEXT IS NULL OR event_type = $1)
            ORDER BY COALESCE(start_at, created_at) DESC, created_at DESC, id ASC
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(filter.event_type)
        .bind(i64::from(page.limit))
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let total: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM live_events WHERE status = 'published' AND ($1::TEXT IS NULL OR event_type = $1)"
        )
        .bind(filter.event_type)
        .fetch_one(&self.pool)
        .await?;

        Ok((events, total.0))
    }

    /// Get events created by user
    pub async fn list_by_creator(&self, creator_id: Uuid, page: PageRequest) -> Result<(Vec<Event>, i64), TripBuddyError> {
        let events = sqlx::query_as::<_, Event>(&format!(
            r#"
            SELECT {EVENT_COLUMNS} FROM live_events
            WHERE creator_id = $1
            ORDER BY created_at DESC, id ASC
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(creator_id)
        .bind(i64::from(page.limit))
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM live_events WHERE creator_id = $1")
            .bind(creator_id)
            .fetch_one(&self.pool)
            .await?;

        Ok((events, total.0))
    }

    /// Published, not yet over events the user has neither swiped nor actively joined
    pub async fn suggestion_candidates(&self, user_id: Uuid, now: DateTime<Utc>, exclude_own: bool) -> Result<Vec<Event>, TripBuddyError> {
        let events = sqlx::query_as::<_, Event>(&format!(
            r#"
            SELECT {EVENT_COLUMNS} FROM live_events e
            WHERE e.status = 'published'
              AND COALESCE(e.end_at, e.start_at, 'infinity'::TIMESTAMPTZ) >= $2
              AND NOT EXISTS (
                  SELECT 1 FROM event_swipes s WHERE s.event_id = e.id AND s.user_id = $1
              )
              AND NOT EXISTS (
                  SELECT 1 FROM event_members m
                  WHERE m.event_id = e.id AND m.user_id = $1 AND m.status <> 'left'
              )
              AND (NOT $3 OR e.creator_id <> $1)
            "#
        ))
        .bind(user_id)
        .bind(now)
        .bind(exclude_own)
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }

    /// Active tags attached to the given events
    pub async fn tags_for_events(&self, event_ids: &[Uuid]) -> Result<Vec<EventTagRow>, TripBuddyError> {
        let rows = sqlx::query_as::<_, EventTagRow>(
            r#"
            SELECT et.event_id, t.id, t.kind, t.code, t.name, t.icon, t.sort_order, t.is_active, t.created_at
            FROM event_tags et
            INNER JOIN tags t ON t.id = et.tag_id
            WHERE et.event_id = ANY($1) AND t.is_active
            ORDER BY et.event_id, t.kind, t.sort_order, t.id
            "#
        )
        .bind(event_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Every tag attached to an event, inactive ones included
    pub async fn stored_tags(&self, event_id: Uuid) -> Result<Vec<Tag>, TripBuddyError> {
        let tags = sqlx::query_as::<_, Tag>(
            r#"
            SELECT t.id, t.kind, t.code, t.name, t.icon, t.sort_order, t.is_active, t.created_at
            FROM event_tags et
            INNER JOIN tags t ON t.id = et.tag_id
            WHERE et.event_id = $1
            ORDER BY t.kind, t.sort_order, t.id
            "#
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(tags)
    }

    /// Count confirmed members of an event
    pub async fn confirmed_count(&self, event_id: Uuid) -> Result<i64, TripBuddyError> {
        let mut conn = self.pool.acquire().await?;
        count_confirmed(&mut conn, event_id).await
    }

    pub async fn set_cover_image(&self, id: Uuid, url: &str) -> Result<Option<Event>, TripBuddyError> {
        let event = sqlx::query_as::<_, Event>(&format!(
            "UPDATE events SET cover_image_url = $2, updated_at = $3 WHERE id = $1 AND NOT is_deleted RETURNING {EVENT_COLUMNS}"
        ))
        .bind(id)
        .bind(url)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        Ok(event)
    }

    /// Append to the gallery unless it already holds `max_photos` entries
    pub async fn append_photo(&self, id: Uuid, url: &str, max_photos: usize) -> Result<Option<Event>, TripBuddyError> {
        let event = sqlx::query_as::<_, Event>(&format!(
            r#"
            UPDATE events
            SET photo_urls = array_append(photo_urls, $2), updated_at = $4
            WHERE id = $1 AND NOT is_deleted AND cardinality(photo_urls) < $3
            RETURNING {EVENT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(url)
        .bind(max_photos as i32)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        Ok(event)
    }

    pub async fn remove_photo(&self, id: Uuid, url: &str) -> Result<Option<Event>, TripBuddyError> {
        let event = sqlx::query_as::<_, Event>(&format!(
            r#"
            UPDATE events
            SET photo_urls = array_remove(photo_urls, $2), updated_at = $3
            WHERE id = $1 AND NOT is_deleted
            RETURNING {EVENT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(url)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        Ok(event)
    }
}

/// Lock a live event row for the rest of the transaction
pub(crate) async fn lock_live(conn: &mut PgConnection, id: Uuid) -> Result<Option<Event>, TripBuddyError> {
    let event = sqlx::query_as::<_, Event>(&format!(
        "SELECT {EVENT_COLUMNS} FROM events WHERE id = $1 AND NOT is_deleted FOR UPDATE"
    ))
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(event)
}

pub(crate) async fn count_confirmed(conn: &mut PgConnection, event_id: Uuid) -> Result<i64, TripBuddyError> {
    let count: (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM event_members WHERE event_id = $1 AND status = 'confirmed'"
    )
    .bind(event_id)
    .fetch_one(&mut *conn)
    .await?;

    Ok(count.0)
}

async fn replace_tags(conn: &mut PgConnection, event_id: Uuid, tag_ids: &[i64]) -> Result<(), TripBuddyError> {
    sqlx::query("DELETE FROM event_tags WHERE event_id = $1")
        .bind(event_id)
        .execute(&mut *conn)
        .await?;

    if !tag_ids.is_empty() {
        sqlx::query(
            "INSERT INTO event_tags (event_id, tag_id) SELECT $1, UNNEST($2::BIGINT[]) ON CONFLICT DO NOTHING"
        )
        .bind(event_id)
        .bind(tag_ids)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}
