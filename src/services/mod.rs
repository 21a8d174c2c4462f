//! Services module
//!
//! This module contains business logic services

pub mod chat;
pub mod event;
pub mod matching;
pub mod membership;
pub mod oauth_state;
pub mod redis;
pub mod storage;
pub mod suggestion;
pub mod taxonomy;

// Re-export commonly used services
pub use chat::ChatService;
pub use event::EventService;
pub use matching::{MatchWeights, PreferenceProfile};
pub use membership::MembershipService;
pub use oauth_state::{OAuthState, OAuthStateStore};
pub use redis::RedisService;
pub use storage::{HttpObjectStorage, ObjectStorage, StoredObject};
pub use suggestion::SuggestionService;
pub use taxonomy::TaxonomyService;

use std::sync::Arc;
use crate::config::settings::Settings;
use crate::database::{DatabasePool, DatabaseService};
use crate::utils::errors::Result;

/// Service factory for creating and managing all services
#[derive(Clone, Debug)]
pub struct ServiceFactory {
    pub database: DatabaseService,
    pub event_service: EventService,
    pub membership_service: MembershipService,
    pub suggestion_service: SuggestionService,
    pub taxonomy_service: TaxonomyService,
    pub chat_service: ChatService,
    pub oauth_state_store: OAuthStateStore,
    pub redis_service: RedisService,
}

impl ServiceFactory {
    /// Create a new ServiceFactory with the HTTP object storage from settings
    pub fn new(settings: Settings, pool: DatabasePool) -> Result<Self> {
        let storage: Arc<dyn ObjectStorage> = Arc::new(HttpObjectStorage::new(settings.storage.clone())?);
        Self::with_storage(settings, pool, storage)
    }

    /// Create a ServiceFactory around a caller-provided object storage
    pub fn with_storage(settings: Settings, pool: DatabasePool, storage: Arc<dyn ObjectStorage>) -> Result<Self> {
        let database = DatabaseService::new(pool);
        let redis_service = RedisService::new(settings.redis.clone())?;

        let taxonomy_service = TaxonomyService::new(database.clone());
        let event_service = EventService::new(database.clone(), taxonomy_service.clone(), storage, settings.clone());
        let membership_service = MembershipService::new(database.clone());
        let suggestion_service = SuggestionService::new(database.clone(), settings.matching.clone());
        let chat_service = ChatService::new(database.clone(), settings.clone());
        let oauth_state_store = OAuthStateStore::new(redis_service.clone(), settings.oauth.clone());

        Ok(Self {
            database,
            event_service,
            membership_service,
            suggestion_service,
            taxonomy_service,
            chat_service,
            oauth_state_store,
            redis_service,
        })
    }

    /// Health check for all services
    pub async fn health_check(&self) -> ServiceHealthStatus {
        let database_healthy = crate::database::health_check(&self.database.pool).await.is_ok();
        let redis_healthy = self.redis_service.health_check().await.unwrap_or(false);

        ServiceHealthStatus {
            database_healthy,
            redis_healthy,
        }
    }
}

/// Health status of the external collaborators
#[derive(Debug, Clone)]
pub struct ServiceHealthStatus {
    pub database_healthy: bool,
    pub redis_healthy: bool,
}

impl ServiceHealthStatus {
    /// The database is required; Redis only backs OAuth state
    pub fn is_healthy(&self) -> bool {
        self.database_healthy
    }

    /// Get list of unhealthy services
    pub fn get_issues(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if !self.database_healthy {
            issues.push("Database connection failed".to_string());
        }
        if !self.redis_healthy {
            issues.push("Redis connection failed".to_string());
        }

        issues
    }
}
