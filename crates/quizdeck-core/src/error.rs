//! Core error types for quizdeck-core.
//!
//! Errors cover I/O, parsing, and question-bank validation. Rejected
//! session commands (selecting on a locked question, advancing with no
//! selection, navigating past the start) are not errors: the engine
//! returns `None` for those and the session keeps running.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for quizdeck-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Storage-related errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Question-bank validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

/// Storage-specific errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Data directory could not be determined or created
    #[error("Cannot prepare data directory: {0}")]
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

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown configuration key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),
}

/// Question-bank validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// The bank contains no questions
    #[error("Question bank is empty")]
    EmptyBank,

    /// A question has no text
    #[error("Question {id} has empty text")]
    EmptyText { id: u32 },

    /// A question offers fewer than two options
    #[error("Question {id} needs at least two options")]
    TooFewOptions { id: u32 },

    /// An option appears twice within one question
    #[error("Question {id} lists option '{option}' more than once")]
    DuplicateOption { id: u32, option: String },

    /// The recorded answer is not one of the options
    #[error("Question {id} has an answer that is not among its options")]
    AnswerNotInOptions { id: u32 },

    /// Two questions share an id
    #[error("Duplicate question id: {0}")]
    DuplicateId(u32),
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        StorageError::QueryFailed(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
