//! Configuration validation module
//!
//! This module provides validation functions for application configuration
//! to ensure all required settings are properly configured.

use crate::utils::errors::{TripBuddyError, Result};
use super::Settings;

/// Validate all configuration settings
pub fn validate_settings(settings: &Settings) -> Result<()> {
    validate_database_config(&settings.database)?;
    validate_redis_config(&settings.redis)?;
    validate_storage_config(&settings.storage)?;
    validate_logging_config(&settings.logging)?;
    validate_matching_config(&settings.matching)?;
    validate_event_rules(&settings.events)?;

    if settings.oauth.state_ttl_seconds == 0 {
        return Err(TripBuddyError::Config(
            "OAuth state TTL must be greater than 0".to_string()
        ));
    }

    Ok(())
}

/// Validate database configuration
fn validate_database_config(config: &super::DatabaseConfig) -> Result<()> {
    if config.url.is_empty() {
        return Err(TripBuddyError::Config(
            "Database URL is required".to_string()
        ));
    }

    if config.max_connections == 0 {
        return Err(TripBuddyError::Config(
            "Max connections must be greater than 0".to_string()
        ));
    }

    if config.min_connections > config.max_connections {
        return Err(TripBuddyError::Config(
            "Min connections cannot be greater than max connections".to_string()
        ));
    }

    Ok(())
}

/// Validate Redis configuration
fn validate_redis_config(config: &super::RedisConfig) -> Result<()> {
    if config.url.is_empty() {
        return Err(TripBuddyError::Config(
            "Redis URL is required".to_string()
        ));
    }

    Ok(())
}

/// Validate object storage configuration
fn validate_storage_config(config: &super::StorageConfig) -> Result<()> {
    url::Url::parse(&config.endpoint)
        .map_err(|e| TripBuddyError::Config(format!("Invalid storage endpoint: {}", e)))?;
    url::Url::parse(&config.public_base_url)
        .map_err(|e| TripBuddyError::Config(format!("Invalid storage public URL: {}", e)))?;

    if config.bucket.is_empty() {
        return Err(TripBuddyError::Config(
            "Storage bucket is required".to_string()
        ));
    }

    if config.max_upload_bytes == 0 {
        return Err(TripBuddyError::Config(
            "Max upload size must be greater than 0".to_string()
        ));
    }

    Ok(())
}

/// Validate logging configuration
fn validate_logging_config(config: &super::LoggingConfig) -> Result<()> {
    if config.level.is_empty() {
        return Err(TripBuddyError::Config(
            "Log level is required".to_string()
        ));
    }

    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.level.as_str()) {
        return Err(TripBuddyError::Config(
            format!("Invalid log level: {}. Valid levels: {:?}", config.level, valid_levels)
        ));
    }

    Ok(())
}

/// Validate matching policy
fn validate_matching_config(config: &super::MatchingConfig) -> Result<()> {
    let weights = [
        config.interest_weight,
        config.food_weight,
        config.travel_style_weight,
        config.category_weight,
        config.generic_weight,
    ];
    if weights.iter().all(|w| *w == 0) {
        return Err(TripBuddyError::Config(
            "At least one matching weight must be greater than 0".to_string()
        ));
    }

    if config.max_page_size == 0 {
        return Err(TripBuddyError::Config(
            "Max page size must be greater than 0".to_string()
        ));
    }

    Ok(())
}

fn validate_event_rules(config: &super::EventRulesConfig) -> Result<()> {
    if config.max_title_length == 0 || config.max_message_length == 0 {
        return Err(TripBuddyError::Config(
            "Title and message length limits must be greater than 0".to_string()
        ));
    }

    Ok(())
}
