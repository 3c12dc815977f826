//! Error types for tasksync
//!
//! One error enum for the whole data layer. Uses thiserror for ergonomic
//! error handling.

use thiserror::Error;

/// Result type alias for tasksync operations
pub type Result<T> = std::result::Result<T, TaskSyncError>;

/// Error type for tasksync operations
#[derive(Error, Debug)]
pub enum TaskSyncError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Storage errors that are not raw SQLite failures
    #[error("Storage error: {0}")]
    Storage(String),

    /// SQLite database errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Remote service errors
    #[error("Network error: {0}")]
    Network(#[from] task_network::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A blocking or background task panicked or was cancelled
    #[error("Task join error: {0}")]
    Join(#[from] tokio::task::JoinError),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl TaskSyncError {
    /// Whether the error came from the remote service
    pub fn is_network(&self) -> bool {
        matches!(self, TaskSyncError::Network(_))
    }
}
