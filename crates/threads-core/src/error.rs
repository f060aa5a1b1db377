//! Error types for the threads service.
//!
//! Every fallible operation in the core library returns [`ThreadsError`].
//! The HTTP layer maps variants to status codes through
//! [`ThreadsError::status_code`].

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the threads library.
#[derive(Debug, Error)]
pub enum ThreadsError {
    // Database errors
    #[error("Database error: {message}")]
    Database {
        message: String,
        #[source]
        source: Option<rusqlite::Error>,
    },

    // File system errors
    #[error("IO error at {path:?}: {message}")]
    Io {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<std::io::Error>,
    },

    // Serialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    // Lookup errors
    #[error("User {user_id} not found")]
    UserNotFound { user_id: i64 },

    #[error("Thread {thread_id} not found")]
    ThreadNotFound { thread_id: i64 },

    #[error("Message {message_id} not found")]
    MessageNotFound { message_id: i64 },

    #[error("{0}")]
    NotFound(String),

    // Access errors
    #[error("{0}")]
    PermissionDenied(String),

    #[error("{0}")]
    Authentication(String),

    #[error("{0}")]
    InvalidToken(String),

    // Validation errors
    #[error("Validation error for {field}: {message}")]
    Validation { field: String, message: String },

    // Credential storage errors
    #[error("Password hashing failed: {0}")]
    PasswordHash(String),

    // Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    // Generic errors
    #[error("{0}")]
    Other(String),
}

/// Result type alias for threads operations.
pub type Result<T> = std::result::Result<T, ThreadsError>;

impl From<std::io::Error> for ThreadsError {
    fn from(err: std::io::Error) -> Self {
        ThreadsError::Io {
            message: err.to_string(),
            path: None,
            source: Some(err),
        }
    }
}

impl From<serde_json::Error> for ThreadsError {
    fn from(err: serde_json::Error) -> Self {
        ThreadsError::Json {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl From<rusqlite::Error> for ThreadsError {
    fn from(err: rusqlite::Error) -> Self {
        ThreadsError::Database {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl From<jsonwebtoken::errors::Error> for ThreadsError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        ThreadsError::InvalidToken(err.to_string())
    }
}

impl ThreadsError {
    /// Create an IO error with path context.
    pub fn io_with_path(err: std::io::Error, path: impl Into<PathBuf>) -> Self {
        ThreadsError::Io {
            message: err.to_string(),
            path: Some(path.into()),
            source: Some(err),
        }
    }

    /// Create a validation error for a single field.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        ThreadsError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Convert to an HTTP status code.
    ///
    /// - 400: validation failures
    /// - 401: missing or rejected credentials
    /// - 403: authenticated but not allowed
    /// - 404: unknown user, thread or message
    /// - 500: everything else
    pub fn status_code(&self) -> u16 {
        match self {
            ThreadsError::Validation { .. } => 400,

            ThreadsError::Authentication(_) | ThreadsError::InvalidToken(_) => 401,

            ThreadsError::PermissionDenied(_) => 403,

            ThreadsError::UserNotFound { .. }
            | ThreadsError::ThreadNotFound { .. }
            | ThreadsError::MessageNotFound { .. }
            | ThreadsError::NotFound(_) => 404,

            _ => 500,
        }
    }

    /// Whether the error is the caller's fault rather than a server fault.
    pub fn is_client_error(&self) -> bool {
        self.status_code() < 500
    }
}
