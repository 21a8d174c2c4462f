//! Error handling for TripBuddy
//!
//! This module defines the main error type used throughout the core and the
//! structural [`ErrorKind`] classification the HTTP boundary maps to status codes.

use thiserror::Error;
use uuid::Uuid;

/// Main error type for TripBuddy operations
#[derive(Error, Debug)]
pub enum TripBuddyError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Object storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("User not found: {user_id}")]
    UserNotFound { user_id: Uuid },

    #[error("Event not found: {event_id}")]
    EventNotFound { event_id: Uuid },

    #[error("Member not found: user {user_id} in event {event_id}")]
    MemberNotFound { event_id: Uuid, user_id: Uuid },

    #[error("Tag not found: {0}")]
    TagNotFound(String),

    #[error("Chat room not found for event {event_id}")]
    ChatRoomNotFound { event_id: Uuid },

    #[error("User {user_id} is already a member of event {event_id}")]
    AlreadyMember { event_id: Uuid, user_id: Uuid },

    #[error("Event {event_id} is full (capacity {capacity})")]
    EventFull { event_id: Uuid, capacity: i32 },

    #[error("Capacity {capacity} is below the {confirmed} confirmed members of event {event_id}")]
    CapacityBelowConfirmed { event_id: Uuid, capacity: i32, confirmed: i64 },

    #[error("The creator cannot leave event {event_id}")]
    CreatorCannotLeave { event_id: Uuid },

    #[error("Event {event_id} is not open ({status})")]
    EventNotOpen { event_id: Uuid, status: String },

    #[error("Tag already exists: {kind}/{code}")]
    DuplicateTag { kind: String, code: String },

    #[error("Invalid state transition: {from} -> {to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Object storage specific errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Upload rejected with status {status}: {body}")]
    UploadRejected { status: u16, body: String },

    #[error("Delete rejected with status {status}")]
    DeleteRejected { status: u16 },

    #[error("Unsupported content type: {0}")]
    UnsupportedContentType(String),

    #[error("Object too large: {size} bytes (limit {limit})")]
    TooLarge { size: usize, limit: usize },
}

/// Result type alias for TripBuddy operations
pub type Result<T> = std::result::Result<T, TripBuddyError>;

/// Stable, machine-checkable error classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    Forbidden,
    Conflict,
    Validation,
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::NotFound => "not_found",
            ErrorKind::Forbidden => "forbidden",
            ErrorKind::Conflict => "conflict",
            ErrorKind::Validation => "validation",
            ErrorKind::Internal => "internal",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TripBuddyError {
    /// Classify the error for the transport boundary
    pub fn kind(&self) -> ErrorKind {
        match self {
            TripBuddyError::UserNotFound { .. }
            | TripBuddyError::EventNotFound { .. }
            | TripBuddyError::MemberNotFound { .. }
            | TripBuddyError::TagNotFound(_)
            | TripBuddyError::ChatRoomNotFound { .. } => ErrorKind::NotFound,
            TripBuddyError::PermissionDenied(_) => ErrorKind::Forbidden,
            TripBuddyError::AlreadyMember { .. }
            | TripBuddyError::EventFull { .. }
            | TripBuddyError::CapacityBelowConfirmed { .. }
            | TripBuddyError::CreatorCannotLeave { .. }
            | TripBuddyError::EventNotOpen { .. }
            | TripBuddyError::DuplicateTag { .. }
            | TripBuddyError::InvalidStateTransition { .. } => ErrorKind::Conflict,
            TripBuddyError::InvalidInput(_) => ErrorKind::Validation,
            TripBuddyError::Storage(StorageError::UnsupportedContentType(_))
            | TripBuddyError::Storage(StorageError::TooLarge { .. }) => ErrorKind::Validation,
            TripBuddyError::Database(_)
            | TripBuddyError::Migration(_)
            | TripBuddyError::Storage(_)
            | TripBuddyError::Config(_)
            | TripBuddyError::Redis(_)
            | TripBuddyError::Http(_)
            | TripBuddyError::Serialization(_)
            | TripBuddyError::Io(_)
            | TripBuddyError::UrlParse(_) => ErrorKind::Internal,
        }
    }

    /// Check if the error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            TripBuddyError::Redis(_)
            | TripBuddyError::Http(_)
            | TripBuddyError::Io(_) => true,
            TripBuddyError::Storage(StorageError::UploadRejected { status, .. })
            | TripBuddyError::Storage(StorageError::DeleteRejected { status }) => *status >= 500,
            _ => false,
        }
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            TripBuddyError::Database(_) => ErrorSeverity::Critical,
            TripBuddyError::Migration(_) => ErrorSeverity::Critical,
            TripBuddyError::Config(_) => ErrorSeverity::Critical,
            TripBuddyError::PermissionDenied(_) => ErrorSeverity::Warning,
            _ => match self.kind() {
                ErrorKind::NotFound | ErrorKind::Validation => ErrorSeverity::Info,
                ErrorKind::Conflict | ErrorKind::Forbidden => ErrorSeverity::Warning,
                ErrorKind::Internal => ErrorSeverity::Error,
            },
        }
    }

    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        TripBuddyError::InvalidInput(message.into())
    }

    pub(crate) fn forbidden(message: impl Into<String>) -> Self {
        TripBuddyError::PermissionDenied(message.into())
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "INFO"),
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}
