//! Custom error types for zipkeep
//!
//! This module defines the error hierarchy for the application using thiserror
//! for ergonomic error definitions.

use thiserror::Error;

/// The main error type for zipkeep operations
#[derive(Error, Debug)]
pub enum ZipkeepError {
    /// Configuration-cache errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Zip container errors
    #[error("Archive error: {0}")]
    Archive(String),

    /// Target path does not exist or is not a file/directory
    #[error("Target not found: {0}")]
    TargetNotFound(String),
}

impl ZipkeepError {
    /// Check if this is a target-not-found error
    pub fn is_target_not_found(&self) -> bool {
        matches!(self, Self::TargetNotFound(_))
    }
}

// Implement From traits for common error types

impl From<std::io::Error> for ZipkeepError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for ZipkeepError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

impl From<zip::result::ZipError> for ZipkeepError {
    fn from(err: zip::result::ZipError) -> Self {
        Self::Archive(err.to_string())
    }
}

/// Result type alias for zipkeep operations
pub type ZipkeepResult<T> = Result<T, ZipkeepError>;
