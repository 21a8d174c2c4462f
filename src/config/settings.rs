//! Application settings management
//!
//! This module defines the configuration structure and provides methods
//! for loading settings from TOML files and environment variables.

use serde::{Deserialize, Serialize};

/// Main application configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
    pub matching: MatchingConfig,
    pub events: EventRulesConfig,
    pub oauth: OAuthConfig,
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_seconds: u64,
    pub idle_timeout_seconds: Option<u64>,
    pub max_lifetime_seconds: Option<u64>,
}

/// Redis configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RedisConfig {
    pub url: String,
    pub prefix: String,
    pub ttl_seconds: u64,
}

/// Object storage configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Base URL objects are PUT to, e.g. `https://storage.example.com`
    pub endpoint: String,
    pub bucket: String,
    /// Base URL clients fetch uploaded objects from
    pub public_base_url: String,
    pub access_token: Option<String>,
    pub timeout_seconds: u64,
    pub max_upload_bytes: usize,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub directory: String,
    pub file_prefix: String,
    pub json: bool,
}

/// Suggestion scoring and paging policy
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MatchingConfig {
    pub interest_weight: u32,
    pub food_weight: u32,
    pub travel_style_weight: u32,
    pub category_weight: u32,
    pub generic_weight: u32,
    pub exclude_own_events: bool,
    pub max_page_size: u32,
}

/// Event validation limits
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EventRulesConfig {
    pub max_title_length: usize,
    pub max_description_length: usize,
    pub max_gallery_photos: usize,
    pub max_message_length: usize,
}

/// OAuth state token configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OAuthConfig {
    pub state_ttl_seconds: u64,
}

impl Settings {
    /// Load settings from configuration file and environment variables
    pub fn new() -> Result<Self, config::ConfigError> {
        let defaults = config::Config::try_from(&Settings::default())?;

        let settings = config::Config::builder()
            .add_source(defaults)
            .add_source(config::File::with_name("config").required(false))
            .add_source(config::Environment::with_prefix("TRIPBUDDY").separator("__"))
            .build()?;

        settings.try_deserialize()
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<(), crate::utils::errors::TripBuddyError> {
        super::validation::validate_settings(self)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "postgresql://localhost/tripbuddy".to_string(),
                max_connections: 10,
                min_connections: 1,
                acquire_timeout_seconds: 30,
                idle_timeout_seconds: Some(600),
                max_lifetime_seconds: Some(1800),
            },
            redis: RedisConfig {
                url: "redis://localhost:6379".to_string(),
                prefix: "tripbuddy:".to_string(),
                ttl_seconds: 3600,
            },
            storage: StorageConfig {
                endpoint: "http://localhost:9000".to_string(),
                bucket: "tripbuddy".to_string(),
                public_base_url: "http://localhost:9000/tripbuddy".to_string(),
                access_token: None,
                timeout_seconds: 30,
                max_upload_bytes: 10 * 1024 * 1024,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                directory: "logs".to_string(),
                file_prefix: "tripbuddy.log".to_string(),
                json: false,
            },
            matching: MatchingConfig {
                interest_weight: 3,
                food_weight: 2,
                travel_style_weight: 2,
                category_weight: 1,
                generic_weight: 1,
                exclude_own_events: true,
                max_page_size: 100,
            },
            events: EventRulesConfig {
                max_title_length: 120,
                max_description_length: 5000,
                max_gallery_photos: 10,
                max_message_length: 4000,
            },
            oauth: OAuthConfig {
                state_ttl_seconds: 600,
            },
        }
    }
}
