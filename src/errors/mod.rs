//! Error handling module for the forum store.
//!
//! Storage failures are recovered inside the store and only ever logged; the
//! remaining kinds are returned to callers that asked for something invalid.

/// Error codes as constants to avoid stringly-typed errors.
pub mod codes {
    pub const STORAGE_READ_ERROR: &str = "STORAGE_READ_ERROR";
    pub const STORAGE_WRITE_ERROR: &str = "STORAGE_WRITE_ERROR";
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    pub const FORBIDDEN: &str = "FORBIDDEN";
}

/// Application error type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    /// Persisted value missing, unreadable or malformed
    StorageRead(String),
    /// Write rejected by the backend (quota, I/O)
    StorageWrite(String),
    /// Topic or category does not exist
    NotFound(String),
    /// Input rejected before anything was written
    Validation(String),
    /// Visitor token does not match the topic creator
    Forbidden(String),
}

impl AppError {
    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::StorageRead(_) => codes::STORAGE_READ_ERROR,
            AppError::StorageWrite(_) => codes::STORAGE_WRITE_ERROR,
            AppError::NotFound(_) => codes::NOT_FOUND,
            AppError::Validation(_) => codes::VALIDATION_ERROR,
            AppError::Forbidden(_) => codes::FORBIDDEN,
        }
    }

    /// Get the error message.
    pub fn message(&self) -> &str {
        match self {
            AppError::StorageRead(msg)
            | AppError::StorageWrite(msg)
            | AppError::NotFound(msg)
            | AppError::Validation(msg)
            | AppError::Forbidden(msg) => msg,
        }
    }

    /// True for the two kinds the store recovers from locally.
    pub fn is_storage(&self) -> bool {
        matches!(self, AppError::StorageRead(_) | AppError::StorageWrite(_))
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error_code(), self.message())
    }
}

impl std::error::Error for AppError {}
