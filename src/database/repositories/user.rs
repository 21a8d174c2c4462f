//! User repository implementation

use sqlx::PgPool;
use chrono::Utc;
use uuid::Uuid;
use crate::models::user::{User, CreateUserRequest};
use crate::utils::errors::TripBuddyError;

#[derive(Clone, Debug)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a user row for an identity resolved upstream
    pub async fn create(&self, request: CreateUserRequest) -> Result<User, TripBuddyError> {
        let now = Utc::now();
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, username, display_name, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $4)
            RETURNING id, username, display_name, created_at, updated_at
            "#
        )
        .bind(request.id.unwrap_or_else(Uuid::new_v4))
        .bind(request.username)
        .bind(request.display_name)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    /// Check that a user exists
    pub async fn exists(&self, id: Uuid) -> Result<bool, TripBuddyError> {
        let exists: (bool,) = sqlx::query_as("SELECT EXISTS (SELECT 1 FROM users WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        Ok(exists.0)
    }
}
