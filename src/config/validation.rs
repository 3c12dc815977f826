//! Configuration validation
//!
//! Validates tasksync configuration for correctness:
//! - Database path is set
//! - Event channel can hold at least one event
//! - Remote backing file is not the database file

use super::tasksync_config::TaskSyncConfig;
use crate::TaskSyncError;

/// Validation error details
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validation result
pub type ValidationResult = std::result::Result<(), Vec<ValidationError>>;

/// Validate a tasksync configuration
pub fn validate_config(config: &TaskSyncConfig) -> ValidationResult {
    let mut errors = Vec::new();

    if config.database.path.as_os_str().is_empty() {
        errors.push(ValidationError::new(
            "database.path",
            "Database path cannot be empty",
        ));
    }

    if config.sync.event_channel_capacity == 0 {
        errors.push(ValidationError::new(
            "sync.event_channel_capacity",
            "Event channel capacity must be greater than 0",
        ));
    }

    if let Some(ref backing_file) = config.remote.backing_file {
        if backing_file.as_os_str().is_empty() {
            errors.push(ValidationError::new(
                "remote.backing_file",
                "Backing file path cannot be empty",
            ));
        } else if *backing_file == config.database.path {
            errors.push(ValidationError::new(
                "remote.backing_file",
                "Backing file must not be the database file",
            ));
        }
    }

    if config.remote.latency_ms > 60_000 {
        tracing::warn!(
            latency_ms = config.remote.latency_ms,
            "Remote latency over a minute (this may be intentional for testing)"
        );
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validate and convert to a crate error
pub fn validate_config_result(config: &TaskSyncConfig) -> crate::Result<()> {
    validate_config(config).map_err(|errors| {
        let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
        TaskSyncError::Config(format!(
            "Configuration validation failed:\n  - {}",
            messages.join("\n  - ")
        ))
    })
}
