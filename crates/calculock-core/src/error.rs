//! Core error types for calculock-core.
//!
//! Every failure a user can trigger is recoverable: the caller shows the
//! message and asks for corrective input. Errors are grouped by the
//! component that raises them and folded into [`CoreError`].

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::catalog::AppId;

/// Core error type for calculock-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Block session errors
    #[error("Block error: {0}")]
    Block(#[from] BlockError),

    /// Category store errors
    #[error("Category error: {0}")]
    Category(#[from] CategoryError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised by the block session and the unblock gate.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BlockError {
    /// A block cannot start with zero apps selected
    #[error("No apps selected: select apps to block first")]
    EmptySelection,

    /// A block is already running
    #[error("A block is already active until {expires_at}")]
    AlreadyActive { expires_at: DateTime<Utc> },

    /// Durations are whole, positive minutes
    #[error("Invalid block duration: {minutes} minutes")]
    InvalidDuration { minutes: u32 },

    /// Unblocking only makes sense while a block is active
    #[error("No block is currently active")]
    NotActive,

    /// The submitted answer was blank
    #[error("Please enter an answer")]
    EmptyAnswer,

    /// App is not part of the catalog
    #[error("Unknown app: {0}")]
    UnknownApp(AppId),
}

/// Errors raised by category mutations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CategoryError {
    /// Name is empty after trimming whitespace
    #[error("Category name must not be empty")]
    EmptyName,

    /// A category with this name already exists
    #[error("Category '{0}' already exists")]
    DuplicateName(String),

    /// No category with this name
    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    /// App is already a member of the category
    #[error("'{app}' is already in '{category}'")]
    AlreadyMember { category: String, app: AppId },

    /// App is not part of the catalog
    #[error("Unknown app: {0}")]
    UnknownApp(AppId),
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

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Key does not exist in the configuration
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::ParseFailed(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
