//! Core error types for postureroom-core.
//!
//! The scheduler itself never surfaces errors to its callers: persistence
//! corruption falls back to defaults and side-effect failures are logged.
//! These types exist for the layers underneath (storage, config, ports) and
//! for hosts that want to validate input before handing it to the core.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for postureroom-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Storage-related errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Durable key/value storage errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to open the backing database
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Database is locked
    #[error("Database is locked")]
    Locked,

    /// Data directory could not be resolved or created
    #[error("Data directory unavailable: {0}")]
    DataDir(String),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Unknown dot-path key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Value could not be parsed into the key's type
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

/// Validation errors for values accepted at a host boundary.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Value outside its accepted range
    #[error("Value for '{field}' out of range: {message}")]
    OutOfRange { field: String, message: String },

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

/// Failures reported by audio and notification ports.
///
/// These are always recovered inside the scheduler.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SideEffectError {
    /// Audio playback was refused or failed
    #[error("Audio playback failed: {0}")]
    Audio(String),

    /// Notification could not be displayed
    #[error("Notification failed: {0}")]
    Notification(String),

    /// Notification permission was refused
    #[error("Notification permission denied")]
    PermissionDenied,
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(err, _msg) => {
                if err.code == rusqlite::ErrorCode::DatabaseLocked {
                    StorageError::Locked
                } else {
                    StorageError::QueryFailed(err.to_string())
                }
            }
            _ => StorageError::QueryFailed(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Storage(err.into())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_error_wraps_into_core_error() {
        let err: CoreError = StorageError::Locked.into();
        assert_eq!(err.to_string(), "Storage error: Database is locked");
    }

    #[test]
    fn validation_error_message_names_field() {
        let err = ValidationError::OutOfRange {
            field: "interval".into(),
            message: "must be greater than 0".into(),
        };
        assert!(err.to_string().contains("interval"));
    }
}
