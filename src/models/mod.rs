//! Data models module
//!
//! This module contains all data structures used throughout the core

use thiserror::Error;

/// Raised when a stored or submitted value is not part of a closed vocabulary
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown {kind}: {value}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl From<UnknownVariant> for crate::utils::errors::TripBuddyError {
    fn from(err: UnknownVariant) -> Self {
        crate::utils::errors::TripBuddyError::InvalidInput(err.to_string())
    }
}

/// Implements string conversions and TEXT column mapping for a closed enum.
macro_rules! text_enum {
    ($name:ident, $label:literal { $($variant:ident => $text:literal $(| $alias:literal)*),+ $(,)? }) => {
        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::models::UnknownVariant;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                match value {
                    $($text $(| $alias)* => Ok($name::$variant),)+
                    other => Err($crate::models::UnknownVariant {
                        kind: $label,
                        value: other.to_string(),
                    }),
                }
            }
        }

        impl sqlx::Type<sqlx::Postgres> for $name {
            fn type_info() -> sqlx::postgres::PgTypeInfo {
                <&str as sqlx::Type<sqlx::Postgres>>::type_info()
            }

            fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
                <&str as sqlx::Type<sqlx::Postgres>>::compatible(ty)
            }
        }

        impl<'r> sqlx::Decode<'r, sqlx::Postgres> for $name {
            fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
                let text = <&str as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
                Ok(text.parse::<$name>()?)
            }
        }

        impl<'q> sqlx::Encode<'q, sqlx::Postgres> for $name {
            fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
                <&str as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.as_str(), buf)
            }
        }
    };
}

pub mod user;
pub mod event;
pub mod member;
pub mod swipe;
pub mod tag;
pub mod chat;
pub mod pagination;
pub mod suggestion;

// Re-export commonly used models
pub use user::{User, CreateUserRequest};
pub use event::{Event, EventType, EventStatus, EventDetails, EventFilter, CreateEventRequest, UpdateEventRequest};
pub use member::{EventMember, MemberRole, MemberStatus, MemberAction, TransitionRejection, JoinEventRequest, Participation};
pub use swipe::{EventSwipe, SwipeDirection};
pub use tag::{Tag, TagKind, UserTag, EventTagRow, CreateTagRequest, PREFERENCE_LEVEL_MIN, PREFERENCE_LEVEL_MAX};
pub use chat::{ChatRoom, ChatMessage, MessageType, SendMessageRequest};
pub use pagination::{Page, PageRequest};
pub use suggestion::{Suggestion, MatchedTag};
