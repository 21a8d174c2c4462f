//! Event membership service
//!
//! Join, leave, confirm and cancel on behalf of the calling user. The
//! transition table is [`MemberAction::apply`]; the repository applies it
//! under the event row lock together with the capacity check.

use tracing::debug;
use uuid::Uuid;
use crate::database::{DatabaseService, ParticipationScope};
use crate::models::member::{EventMember, JoinEventRequest, MemberAction, Participation};
use crate::utils::errors::{Result, TripBuddyError};
use crate::utils::logging::{log_member_transition, log_rejection};

#[derive(Clone, Debug)]
pub struct MembershipService {
    db: DatabaseService,
}

impl MembershipService {
    pub fn new(db: DatabaseService) -> Self {
        Self { db }
    }

    /// Request a seat; the membership starts (again) as `pending`
    pub async fn join(&self, user_id: Uuid, event_id: Uuid, request: JoinEventRequest) -> Result<EventMember> {
        debug!(user_id = %user_id, event_id = %event_id, "Join requested");

        self.db.require_user(user_id).await?;

        let note = request.note.map(|note| note.trim().to_string()).filter(|note| !note.is_empty());
        let member = self.db.members.join(event_id, user_id, note).await.map_err(|err| {
            log_rejection("join", &err);
            err
        })?;

        log_member_transition(event_id, user_id, None, member.status.as_str());
        Ok(member)
    }

    pub async fn leave(&self, user_id: Uuid, event_id: Uuid) -> Result<EventMember> {
        self.transition(user_id, event_id, MemberAction::Leave).await
    }

    /// Take a seat; fails with `EventFull` once capacity is reached
    pub async fn confirm(&self, user_id: Uuid, event_id: Uuid) -> Result<EventMember> {
        self.transition(user_id, event_id, MemberAction::Confirm).await
    }

    /// Withdraw a pending request
    pub async fn cancel(&self, user_id: Uuid, event_id: Uuid) -> Result<EventMember> {
        self.transition(user_id, event_id, MemberAction::Decline).await
    }

    async fn transition(&self, user_id: Uuid, event_id: Uuid, action: MemberAction) -> Result<EventMember> {
        let operation = format!("{:?}", action).to_lowercase();
        debug!(user_id = %user_id, event_id = %event_id, action = %operation, "Membership transition requested");

        match self.db.members.transition(event_id, user_id, action).await {
            Ok((previous, member)) => {
                log_member_transition(event_id, user_id, Some(previous.as_str()), member.status.as_str());
                Ok(member)
            }
            Err(err) => {
                log_rejection(&operation, &err);
                Err(err)
            }
        }
    }

    /// Every membership row of a live event, history included
    pub async fn list_members(&self, event_id: Uuid) -> Result<Vec<EventMember>> {
        if self.db.events.find_live(event_id).await?.is_none() {
            return Err(TripBuddyError::EventNotFound { event_id });
        }
        self.db.members.list_for_event(event_id).await
    }

    /// Events the user currently belongs to
    pub async fn joined_events(&self, user_id: Uuid) -> Result<Vec<Participation>> {
        self.db.members.list_participations(user_id, ParticipationScope::Active).await
    }

    /// Completed events the user took part in
    pub async fn history(&self, user_id: Uuid) -> Result<Vec<Participation>> {
        self.db.members.list_participations(user_id, ParticipationScope::Completed).await
    }
}
