//! TripBuddy core
//!
//! Backend core of a social trip service: users create and join events,
//! swipe on suggestions ranked by shared tags, and chat inside the events
//! they are confirmed in. The library is transport-agnostic; every operation
//! takes the id of an already authenticated user.

pub mod config;
pub mod database;
pub mod models;
pub mod services;
pub mod utils;

// Re-export commonly used types
pub use config::Settings;
pub use utils::errors::{TripBuddyError, ErrorKind, Result};

// Re-export main components for easy access
pub use database::DatabaseService;
pub use services::ServiceFactory;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get library information
pub fn info() -> String {
    format!("{} v{}", NAME, VERSION)
}
