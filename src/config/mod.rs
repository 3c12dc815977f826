//! Configuration system
//!
//! Loads ~/.config/tasksync/config.yaml with sections for:
//! - The local SQLite database
//! - The (fake) remote task service
//! - The background sync scope

mod tasksync_config;
pub mod validation;

pub use tasksync_config::{RemoteConfig, SyncConfig, TaskSyncConfig};
pub use validation::{validate_config, validate_config_result, ValidationError};
