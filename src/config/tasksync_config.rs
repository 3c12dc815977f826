//! tasksync configuration file handling

use crate::storage::DatabaseConfig;
use crate::sync::{DEFAULT_EVENT_CHANNEL_CAPACITY, DEFAULT_SHUTDOWN_GRACE};
use crate::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Remote task service settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Simulated latency of the fake remote, in milliseconds
    #[serde(default = "default_latency_ms")]
    pub latency_ms: u64,

    /// JSONL file the fake remote persists its tasks to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backing_file: Option<PathBuf>,
}

fn default_latency_ms() -> u64 {
    task_network::SERVICE_LATENCY.as_millis() as u64
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            latency_ms: default_latency_ms(),
            backing_file: None,
        }
    }
}

impl RemoteConfig {
    pub fn latency(&self) -> Duration {
        Duration::from_millis(self.latency_ms)
    }
}

/// Background sync settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// How long shutdown waits for in-flight pushes, in milliseconds
    #[serde(default = "default_shutdown_grace_ms")]
    pub shutdown_grace_ms: u64,

    /// Capacity of the sync event broadcast channel
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,
}

fn default_shutdown_grace_ms() -> u64 {
    DEFAULT_SHUTDOWN_GRACE.as_millis() as u64
}

fn default_event_channel_capacity() -> usize {
    DEFAULT_EVENT_CHANNEL_CAPACITY
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            shutdown_grace_ms: default_shutdown_grace_ms(),
            event_channel_capacity: default_event_channel_capacity(),
        }
    }
}

impl SyncConfig {
    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_millis(self.shutdown_grace_ms)
    }
}

/// tasksync configuration
///
/// Represents the complete ~/.config/tasksync/config.yaml file. Every
/// section is optional and falls back to its defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskSyncConfig {
    /// Local database settings
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Remote service settings
    #[serde(default)]
    pub remote: RemoteConfig,

    /// Background sync settings
    #[serde(default)]
    pub sync: SyncConfig,
}

impl TaskSyncConfig {
    /// Create a configuration with every default
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from the default path
    pub fn load_default() -> Result<Self> {
        Self::load(Self::default_path())
    }

    /// Load configuration from a specific path
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(crate::TaskSyncError::Config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }

        tracing::info!(path = %path.display(), "Loading tasksync configuration");

        let content = fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content)?;

        tracing::debug!(
            database = %config.database.path.display(),
            latency_ms = config.remote.latency_ms,
            "Configuration loaded successfully"
        );

        Ok(config)
    }

    /// Load from `path` if given, else the default path, else defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let default_path = Self::default_path();
                if default_path.exists() {
                    Self::load(default_path)
                } else {
                    tracing::debug!("No config file, using defaults");
                    Ok(Self::default())
                }
            }
        }
    }

    /// Save configuration to the default path
    pub fn save_default(&self) -> Result<()> {
        self.save(Self::default_path())
    }

    /// Save configuration to a specific path
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        tracing::info!(path = %path.display(), "Saving tasksync configuration");

        let yaml = serde_yaml::to_string(self)?;
        fs::write(path, yaml)?;

        Ok(())
    }

    /// Get the default config path (~/.config/tasksync/config.yaml)
    pub fn default_path() -> PathBuf {
        // Always use ~/.config for consistency across platforms (macOS, Linux)
        let mut path = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push(".config");
        path.push("tasksync");
        path.push("config.yaml");
        path
    }
}
