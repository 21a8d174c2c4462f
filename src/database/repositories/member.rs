//! Event membership repository
//!
//! Every status change runs in a transaction that locks the event row first
//! and the member row second. Confirm counts confirmed members while holding
//! the event lock, so two confirms racing for the last seat serialise.

use sqlx::PgPool;
use chrono::Utc;
use uuid::Uuid;
use crate::database::repositories::chat::post_system_message;
use crate::database::repositories::event::{count_confirmed, lock_live};
use crate::models::chat::MessageType;
use crate::models::event::EventStatus;
use crate::models::member::{EventMember, MemberAction, MemberRole, MemberStatus, Participation, TransitionRejection};
use crate::utils::errors::TripBuddyError;

const MEMBER_COLUMNS: &str = "event_id, user_id, role, status, joined_at, confirmed_at, left_at, note";

const PARTICIPATION_COLUMNS: &str = "e.id, e.creator_id, e.title, e.description, e.event_type, e.location_name, \
     e.latitude, e.longitude, e.start_at, e.end_at, e.max_participants, e.budget_min, e.budget_max, e.status, \
     e.cover_image_url, e.photo_urls, e.created_at, e.updated_at, \
     m.role, m.status AS member_status, m.joined_at, m.confirmed_at";

/// Which memberships of a user to list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticipationScope {
    /// Pending, confirmed or declined memberships
    Active,
    /// Confirmed memberships of completed events
    Completed,
}

#[derive(Clone, Debug)]
pub struct MemberRepository {
    pool: PgPool,
}

impl MemberRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a membership row, whatever its status
    pub async fn find(&self, event_id: Uuid, user_id: Uuid) -> Result<Option<EventMember>, TripBuddyError> {
        let member = sqlx::query_as::<_, EventMember>(&format!(
            "SELECT {MEMBER_COLUMNS} FROM event_members WHERE event_id = $1 AND user_id = $2"
        ))
        .bind(event_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(member)
    }

    /// Start a pending episode: insert, or reset a `left`/`declined` row.
    ///
    /// The event row stays locked while its status is checked and the row is
    /// written, so a concurrent complete, cancel or delete cannot slip between.
    pub async fn join(&self, event_id: Uuid, user_id: Uuid, note: Option<String>) -> Result<EventMember, TripBuddyError> {
        let mut tx = self.pool.begin().await?;

        let event = lock_live(&mut tx, event_id)
            .await?
            .ok_or(TripBuddyError::EventNotFound { event_id })?;
        if !event.status.accepts_members() {
            return Err(TripBuddyError::EventNotOpen { event_id, status: event.status.to_string() });
        }

        let joined = sqlx::query_as::<_, EventMember>(&format!(
            r#"
            INSERT INTO event_members (event_id, user_id, role, status, joined_at, note)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (event_id, user_id) DO UPDATE
                SET status = EXCLUDED.status,
                    joined_at = EXCLUDED.joined_at,
                    confirmed_at = NULL,
                    left_at = NULL,
                    note = EXCLUDED.note
                WHERE event_members.status IN ('left', 'declined')
            RETURNING {MEMBER_COLUMNS}
            "#
        ))
        .bind(event_id)
        .bind(user_id)
        .bind(MemberRole::Member)
        .bind(MemberStatus::Pending)
        .bind(Utc::now())
        .bind(note)
        .fetch_optional(&mut *tx)
        .await?;

        match joined {
            Some(member) => {
                tx.commit().await?;
                Ok(member)
            }
            None => {
                let current: Option<(MemberStatus,)> = sqlx::query_as(
                    "SELECT status FROM event_members WHERE event_id = $1 AND user_id = $2"
                )
                .bind(event_id)
                .bind(user_id)
                .fetch_optional(&mut *tx)
                .await?;

                let rejection = match MemberAction::Join.apply(current.map(|(status,)| status)) {
                    Err(rejection) => rejection,
                    Ok(_) => TransitionRejection::AlreadyMember,
                };
                Err(rejection.into_error(event_id, user_id))
            }
        }
    }

    /// Apply confirm, decline or leave to an existing membership
    pub async fn transition(&self, event_id: Uuid, user_id: Uuid, action: MemberAction) -> Result<(MemberStatus, EventMember), TripBuddyError> {
        let mut tx = self.pool.begin().await?;

        let event = lock_live(&mut tx, event_id)
            .await?
            .ok_or(TripBuddyError::EventNotFound { event_id })?;

        let current = sqlx::query_as::<_, EventMember>(&format!(
            "SELECT {MEMBER_COLUMNS} FROM event_members WHERE event_id = $1 AND user_id = $2 FOR UPDATE"
        ))
        .bind(event_id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;

        let previous = current.as_ref().map(|m| m.status);
        let next = action
            .apply(previous)
            .map_err(|rejection| rejection.into_error(event_id, user_id))?;

        // Memberships of a completed event are its attendance record
        if event.status == EventStatus::Completed && action != MemberAction::Confirm {
            return Err(TripBuddyError::EventNotOpen { event_id, status: event.status.to_string() });
        }

        match action {
            MemberAction::Leave => {
                if current.as_ref().map(|m| m.role) == Some(MemberRole::Creator) {
                    return Err(TripBuddyError::CreatorCannotLeave { event_id });
                }
            }
            MemberAction::Confirm => {
                if !event.status.accepts_members() {
                    return Err(TripBuddyError::EventNotOpen { event_id, status: event.status.to_string() });
                }
                if let Some(capacity) = event.max_participants {
                    let confirmed = count_confirmed(&mut tx, event_id).await?;
                    if confirmed >= i64::from(capacity) {
                        return Err(TripBuddyError::EventFull { event_id, capacity });
                    }
                }
            }
            _ => {}
        }

        let now = Utc::now();
        let confirmed_at = (next == MemberStatus::Confirmed).then_some(now);
        let left_at = (next == MemberStatus::Left).then_some(now);

        let member = sqlx::query_as::<_, EventMember>(&format!(
            r#"
            UPDATE event_members
            SET status = $3,
                confirmed_at = COALESCE($4, confirmed_at),
                left_at = COALESCE($5, left_at)
            WHERE event_id = $1 AND user_id = $2
            RETURNING {MEMBER_COLUMNS}
            "#
        ))
        .bind(event_id)
        .bind(user_id)
        .bind(next)
        .bind(confirmed_at)
        .bind(left_at)
        .fetch_one(&mut *tx)
        .await?;

        match (previous, next) {
            (_, MemberStatus::Confirmed) => {
                post_system_message(&mut tx, event_id, Some(user_id), MessageType::Confirm).await?;
            }
            (Some(MemberStatus::Confirmed), MemberStatus::Left) => {
                post_system_message(&mut tx, event_id, Some(user_id), MessageType::Leave).await?;
            }
            _ => {}
        }

        tx.commit().await?;

        // previous is always Some here: apply() rejects transitions without a row
        Ok((previous.unwrap_or(next), member))
    }

    /// Members of an event in join order
    pub async fn list_for_event(&self, event_id: Uuid) -> Result<Vec<EventMember>, TripBuddyError> {
        let members = sqlx::query_as::<_, EventMember>(&format!(
            "SELECT {MEMBER_COLUMNS} FROM event_members WHERE event_id = $1 ORDER BY joined_at ASC, user_id ASC"
        ))
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(members)
    }

    /// Memberships of a user together with their live events
    pub async fn list_participations(&self, user_id: Uuid, scope: ParticipationScope) -> Result<Vec<Participation>, TripBuddyError> {
        let condition = match scope {
            ParticipationScope::Active => "m.status <> 'left'",
            ParticipationScope::Completed => "m.status = 'confirmed' AND e.status = 'completed'",
        };

        let rows = sqlx::query_as::<_, Participation>(&format!(
            r#"
            SELECT {PARTICIPATION_COLUMNS}
            FROM event_members m
            INNER JOIN live_events e ON e.id = m.event_id
            WHERE m.user_id = $1 AND {condition}
            ORDER BY COALESCE(e.start_at, e.created_at) DESC, e.id ASC
            "#
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
