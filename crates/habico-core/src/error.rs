//! Core error types for habico-core.
//!
//! Nothing in the engine itself can fail; these errors come from the
//! collaborators around it (storage, configuration, the AI service) and
//! from input validation at the shell boundary.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for habico-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Storage-related errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// AI service errors
    #[error("AI service error: {0}")]
    Ai(#[from] AiError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Key/value store errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to open the backing database
    #[error("Failed to open store at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Database is locked
    #[error("Store is locked")]
    Locked,

    /// A stored document could not be decoded
    #[error("Corrupt document under key '{key}': {message}")]
    Corrupt { key: String, message: String },

    /// The data directory could not be resolved or created
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
    #[error("unknown config key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

/// Errors talking to the external text-generation service.
#[derive(Error, Debug)]
pub enum AiError {
    /// No API key could be found in the environment or the keyring
    #[error("No API key configured (set GEMINI_API_KEY or run `habico-cli auth set-key`)")]
    MissingApiKey,

    /// Transport-level failure
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status
    #[error("Service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The response did not have the expected shape
    #[error("Malformed response: {0}")]
    Malformed(String),

    /// The endpoint URL could not be built
    #[error("Invalid endpoint: {0}")]
    Endpoint(#[from] url::ParseError),

    /// Keyring access failed
    #[error("Keyring error: {0}")]
    Keyring(String),
}

/// Validation errors raised at the shell boundary.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// A required text field was blank
    #[error("'{field}' must not be empty")]
    EmptyField { field: String },

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },

    /// Chat quota exhausted for the current plan
    #[error("{0}")]
    ChatLimit(String),

    /// A request of the same kind is still outstanding
    #[error("A {0} request is already in flight")]
    Busy(&'static str),

    /// The feature needs a paid plan
    #[error("{0} are available on the Monthly and Lifetime plans")]
    ProFeature(&'static str),
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(inner, _msg) => {
                if inner.code == rusqlite::ErrorCode::DatabaseLocked {
                    StorageError::Locked
                } else {
                    StorageError::QueryFailed(err.to_string())
                }
            }
            _ => StorageError::QueryFailed(err.to_string()),
        }
    }
}

impl From<keyring::Error> for AiError {
    fn from(err: keyring::Error) -> Self {
        AiError::Keyring(err.to_string())
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
        assert_eq!(err.to_string(), "Storage error: Store is locked");
    }

    #[test]
    fn sqlite_lock_maps_to_locked() {
        let locked = rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_LOCKED),
            None,
        );
        assert!(matches!(StorageError::from(locked), StorageError::Locked));
    }

    #[test]
    fn validation_messages_are_readable() {
        let err = ValidationError::EmptyField {
            field: "trigger".into(),
        };
        assert_eq!(err.to_string(), "'trigger' must not be empty");
    }
}
