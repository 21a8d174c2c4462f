//! Logging configuration and setup
//!
//! This module provides logging initialization and structured logging utilities
//! for the TripBuddy core.

use tracing::{info, warn, error, debug};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};
use uuid::Uuid;
use crate::config::LoggingConfig;
use crate::utils::errors::{ErrorSeverity, Result, TripBuddyError};

/// Initialize logging based on configuration.
///
/// The returned guard flushes the file appender on drop and must be held for
/// the lifetime of the process.
pub fn init_logging(config: &LoggingConfig) -> Result<WorkerGuard> {
    let file_appender = tracing_appender::rolling::daily(&config.directory, &config.file_prefix);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = if config.json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(non_blocking)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(non_blocking)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.level))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stdout))
        .with(file_layer)
        .try_init()
        .map_err(|e| TripBuddyError::Config(format!("Failed to initialize logging: {}", e)))?;

    info!("Logging initialized with level: {}", config.level);
    Ok(guard)
}

/// Log event management actions
pub fn log_event_action(event_id: Uuid, action: &str, user_id: Uuid, details: Option<&str>) {
    info!(
        event_id = %event_id,
        action = action,
        user_id = %user_id,
        details = details,
        "Event action performed"
    );
}

/// Log a membership status change
pub fn log_member_transition(event_id: Uuid, user_id: Uuid, from: Option<&str>, to: &str) {
    info!(
        event_id = %event_id,
        user_id = %user_id,
        from = from.unwrap_or("none"),
        to = to,
        "Membership transition"
    );
}

/// Log swipes
pub fn log_swipe(user_id: Uuid, event_id: Uuid, direction: &str) {
    debug!(
        user_id = %user_id,
        event_id = %event_id,
        direction = direction,
        "Swipe recorded"
    );
}

/// Log a rejected operation at a level matching its severity
pub fn log_rejection(operation: &str, error: &TripBuddyError) {
    match error.severity() {
        ErrorSeverity::Info => debug!(operation = operation, kind = %error.kind(), error = %error, "Operation rejected"),
        ErrorSeverity::Warning => warn!(operation = operation, kind = %error.kind(), error = %error, "Operation rejected"),
        ErrorSeverity::Error | ErrorSeverity::Critical => {
            error!(operation = operation, kind = %error.kind(), error = %error, "Operation failed")
        }
    }
}

/// Log external collaborator errors with context
pub fn log_api_error(api: &str, error: &str, context: Option<&str>) {
    error!(
        api = api,
        error = error,
        context = context,
        "API error occurred"
    );
}
