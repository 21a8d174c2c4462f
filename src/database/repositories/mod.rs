//! Database repositories module
//!
//! This module contains all repository implementations for data access

pub mod user;
pub mod event;
pub mod member;
pub mod swipe;
pub mod tag;
pub mod chat;

// Re-export repositories
pub use user::UserRepository;
pub use event::EventRepository;
pub use member::{MemberRepository, ParticipationScope};
pub use swipe::SwipeRepository;
pub use tag::TagRepository;
pub use chat::ChatRepository;
