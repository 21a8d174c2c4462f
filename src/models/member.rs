//! Event membership model and the participation state machine

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;
use super::event::Event;
use crate::utils::errors::TripBuddyError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberRole {
    Creator,
    Member,
}

text_enum!(MemberRole, "member role" {
    Creator => "creator",
    Member => "member",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberStatus {
    Pending,
    Confirmed,
    Declined,
    Left,
}

text_enum!(MemberStatus, "member status" {
    Pending => "pending",
    Confirmed => "confirmed",
    Declined => "declined",
    Left => "left",
});

impl MemberStatus {
    /// A `left` row is history only; every other status is a live membership.
    pub fn is_active(&self) -> bool {
        !matches!(self, MemberStatus::Left)
    }
}

/// Transitions a user can request on their own membership
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberAction {
    Join,
    Confirm,
    Decline,
    Leave,
}

impl MemberAction {
    pub fn target(&self) -> MemberStatus {
        match self {
            MemberAction::Join => MemberStatus::Pending,
            MemberAction::Confirm => MemberStatus::Confirmed,
            MemberAction::Decline => MemberStatus::Declined,
            MemberAction::Leave => MemberStatus::Left,
        }
    }

    /// Apply the action to the current membership status (`None` = no row).
    ///
    /// Capacity is not considered here; the repository checks it under lock.
    pub fn apply(self, current: Option<MemberStatus>) -> Result<MemberStatus, TransitionRejection> {
        use MemberStatus::*;
        match (self, current) {
            (MemberAction::Join, None | Some(Left) | Some(Declined)) => Ok(Pending),
            (MemberAction::Join, Some(Pending) | Some(Confirmed)) => Err(TransitionRejection::AlreadyMember),

            (_, None | Some(Left)) => Err(TransitionRejection::NotAMember),

            (MemberAction::Confirm, Some(Pending)) => Ok(Confirmed),
            (MemberAction::Decline, Some(Pending)) => Ok(Declined),
            (MemberAction::Leave, Some(_)) => Ok(Left),

            (action, Some(from)) => Err(TransitionRejection::Invalid { from, to: action.target() }),
        }
    }
}

/// Why a membership transition was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionRejection {
    AlreadyMember,
    NotAMember,
    Invalid { from: MemberStatus, to: MemberStatus },
}

impl TransitionRejection {
    pub fn into_error(self, event_id: Uuid, user_id: Uuid) -> TripBuddyError {
        match self {
            TransitionRejection::AlreadyMember => TripBuddyError::AlreadyMember { event_id, user_id },
            TransitionRejection::NotAMember => TripBuddyError::MemberNotFound { event_id, user_id },
            TransitionRejection::Invalid { from, to } => TripBuddyError::InvalidStateTransition {
                from: from.to_string(),
                to: to.to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EventMember {
    pub event_id: Uuid,
    pub user_id: Uuid,
    pub role: MemberRole,
    pub status: MemberStatus,
    pub joined_at: DateTime<Utc>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub left_at: Option<DateTime<Utc>>,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JoinEventRequest {
    pub note: Option<String>,
}

/// A user's membership joined with the event it belongs to
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Participation {
    #[sqlx(flatten)]
    pub event: Event,
    pub role: MemberRole,
    pub member_status: MemberStatus,
    pub joined_at: DateTime<Utc>,
    pub confirmed_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use MemberStatus::*;

    #[test]
    fn test_join_lands_in_pending() {
        assert_eq!(MemberAction::Join.apply(None), Ok(Pending));
        assert_eq!(MemberAction::Join.apply(Some(Left)), Ok(Pending));
        assert_eq!(MemberAction::Join.apply(Some(Declined)), Ok(Pending));
    }

    #[test]
    fn test_join_while_member_is_rejected() {
        assert_eq!(MemberAction::Join.apply(Some(Pending)), Err(TransitionRejection::AlreadyMember));
        assert_eq!(MemberAction::Join.apply(Some(Confirmed)), Err(TransitionRejection::AlreadyMember));
    }

    #[test]
    fn test_actions_without_membership() {
        for action in [MemberAction::Confirm, MemberAction::Decline, MemberAction::Leave] {
            assert_eq!(action.apply(None), Err(TransitionRejection::NotAMember));
            assert_eq!(action.apply(Some(Left)), Err(TransitionRejection::NotAMember));
        }
    }

    #[test]
    fn test_forward_only_within_episode() {
        assert_eq!(MemberAction::Confirm.apply(Some(Pending)), Ok(Confirmed));
        assert_eq!(MemberAction::Decline.apply(Some(Pending)), Ok(Declined));
        assert_eq!(
            MemberAction::Confirm.apply(Some(Declined)),
            Err(TransitionRejection::Invalid { from: Declined, to: Confirmed })
        );
        assert_eq!(
            MemberAction::Decline.apply(Some(Confirmed)),
            Err(TransitionRejection::Invalid { from: Confirmed, to: Declined })
        );
        assert_eq!(
            MemberAction::Confirm.apply(Some(Confirmed)),
            Err(TransitionRejection::Invalid { from: Confirmed, to: Confirmed })
        );
    }

    #[test]
    fn test_leave_from_any_live_status() {
        for status in [Pending, Confirmed, Declined] {
            assert_eq!(MemberAction::Leave.apply(Some(status)), Ok(Left));
        }
    }

    #[test]
    fn test_full_episode_cycle() {
        let mut status = MemberAction::Join.apply(None).unwrap();
        status = MemberAction::Confirm.apply(Some(status)).unwrap();
        status = MemberAction::Leave.apply(Some(status)).unwrap();
        status = MemberAction::Join.apply(Some(status)).unwrap();
        assert_eq!(status, Pending);
    }

    #[test]
    fn test_rejections_map_to_error_kinds() {
        use crate::utils::errors::ErrorKind;
        let (event_id, user_id) = (Uuid::new_v4(), Uuid::new_v4());

        assert_eq!(TransitionRejection::AlreadyMember.into_error(event_id, user_id).kind(), ErrorKind::Conflict);
        assert_eq!(TransitionRejection::NotAMember.into_error(event_id, user_id).kind(), ErrorKind::NotFound);
        let invalid = TransitionRejection::Invalid { from: Declined, to: Confirmed }.into_error(event_id, user_id);
        assert_eq!(invalid.kind(), ErrorKind::Conflict);
        assert_eq!(invalid.to_string(), "Invalid state transition: declined -> confirmed");
    }

    #[test]
    fn test_status_round_trip_through_text() {
        for status in MemberStatus::ALL {
            assert_eq!(status.as_str().parse::<MemberStatus>().unwrap(), *status);
        }
        assert!(!Left.is_active());
        assert!(Declined.is_active());
    }
}
