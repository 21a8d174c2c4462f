//! Test context for unified test setup

use std::sync::Arc;
use tripbuddy::config::Settings;
use tripbuddy::database::DatabaseService;
use tripbuddy::services::ServiceFactory;

use super::database_helper::TestDatabase;
use super::test_data::MemoryStorage;

/// Database, services and in-memory object storage for one test
pub struct TestContext {
    pub database: TestDatabase,
    pub services: ServiceFactory,
    pub storage: Arc<MemoryStorage>,
    pub settings: Settings,
}

impl TestContext {
    /// `None` when no test database is configured
    pub async fn new() -> Option<Self> {
        Self::with_settings(Settings::default()).await
    }

    pub async fn with_settings(mut settings: Settings) -> Option<Self> {
        let database = TestDatabase::connect().await?;
        settings.database.url = database.database_url.clone();

        let storage = Arc::new(MemoryStorage::default());
        let services = ServiceFactory::with_storage(settings.clone(), database.pool.clone(), storage.clone())
            .expect("Failed to build services");

        Some(Self {
            database,
            services,
            storage,
            settings,
        })
    }

    pub fn db(&self) -> &DatabaseService {
        &self.services.database
    }
}
