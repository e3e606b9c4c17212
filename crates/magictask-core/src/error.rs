//! Core error types for magictask-core.
//!
//! One top-level [`CoreError`] with dedicated enums for the store, the TOML
//! configuration, and input validation.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for magictask-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Task or app-state store errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The countdown driver needs a tokio runtime to spawn onto
    #[error("No tokio runtime available to drive the timer")]
    NoRuntime,

    /// The runner was shut down and can no longer drive its timer
    #[error("Timer runner has been shut down")]
    RunnerShutDown,

    /// A thread panicked while holding the timer lock
    #[error("Timer lock poisoned")]
    LockPoisoned,

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised by the task store and the app-state store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The referenced record does not exist
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// Query execution failed
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A stored document could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The request was rejected before touching the store
    #[error("Invalid input: {0}")]
    Invalid(#[from] ValidationError),

    /// A stored row does not decode into the model
    #[error("Corrupt record {id}: {message}")]
    Corrupt { id: String, message: String },

    /// The store could not be reached
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub fn task_not_found(id: &str) -> Self {
        StoreError::NotFound {
            kind: "Task",
            id: id.to_string(),
        }
    }

    pub fn subtask_not_found(id: &str) -> Self {
        StoreError::NotFound {
            kind: "Subtask",
            id: id.to_string(),
        }
    }
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

    /// Key does not name a configuration value
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// The home directory could not be determined
    #[error("Could not determine a data directory")]
    NoDataDir,
}

/// Validation errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    /// Title missing or blank
    #[error("{0} title is required")]
    EmptyTitle(&'static str),

    /// Urgency outside 0..=1
    #[error("Invalid urgency value {0}: expected 0 or 1")]
    InvalidUrgency(u8),

    /// Effort outside 1..=3
    #[error("Invalid effort value {0}: expected 1, 2 or 3")]
    InvalidEffort(u8),

    /// Update request carried no changes
    #[error("No valid fields to update provided")]
    EmptyUpdate,

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
