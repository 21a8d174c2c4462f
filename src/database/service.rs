//! Database service layer
//!
//! Bundles one repository per aggregate over a shared pool

use uuid::Uuid;
use crate::database::{
    DatabasePool, UserRepository, EventRepository, MemberRepository, SwipeRepository, TagRepository, ChatRepository,
};
use crate::utils::errors::TripBuddyError;

#[derive(Debug, Clone)]
pub struct DatabaseService {
    pub pool: DatabasePool,
    pub users: UserRepository,
    pub events: EventRepository,
    pub members: MemberRepository,
    pub swipes: SwipeRepository,
    pub tags: TagRepository,
    pub chats: ChatRepository,
}

impl DatabaseService {
    pub fn new(pool: DatabasePool) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            events: EventRepository::new(pool.clone()),
            members: MemberRepository::new(pool.clone()),
            swipes: SwipeRepository::new(pool.clone()),
            tags: TagRepository::new(pool.clone()),
            chats: ChatRepository::new(pool.clone()),
            pool,
        }
    }

    /// Fail with `UserNotFound` unless the user row exists
    pub async fn require_user(&self, id: Uuid) -> Result<(), TripBuddyError> {
        if self.users.exists(id).await? {
            Ok(())
        } else {
            Err(TripBuddyError::UserNotFound { user_id: id })
        }
    }
}
