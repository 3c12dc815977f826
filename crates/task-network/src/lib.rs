//! Remote task service for tasksync
//!
//! Defines the task shape used by the remote service and the
//! [`NetworkDataSource`] contract the data layer talks to. The only
//! implementation shipped here is [`FakeNetworkDataSource`], an in-memory
//! stand-in with simulated latency.
//!
//! # Example
//!
//! ```no_run
//! use task_network::{FakeNetworkDataSource, NetworkDataSource, TaskStatus};
//!
//! # async fn demo() -> task_network::Result<()> {
//! let remote = FakeNetworkDataSource::new();
//!
//! let mut tasks = remote.load_tasks().await?;
//! tasks[0].status = TaskStatus::Complete;
//! remote.save_tasks(tasks).await?;
//! # Ok(())
//! # }
//! ```

mod fake;
mod jsonl;

pub use fake::{seed_tasks, FailingNetworkDataSource, FakeNetworkDataSource, SERVICE_LATENCY};
pub use jsonl::{read_tasks, write_tasks};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when talking to the remote service
#[derive(Error, Debug)]
pub enum Error {
    #[error("Remote service unavailable: {0}")]
    Unavailable(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for remote operations
pub type Result<T> = std::result::Result<T, Error>;

/// Task status as the remote service models it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    #[default]
    Active,
    Complete,
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskStatus::Active => write!(f, "ACTIVE"),
            TaskStatus::Complete => write!(f, "COMPLETE"),
        }
    }
}

/// A task as stored by the remote service
///
/// The remote schema drifts from the local one: the description is called
/// `shortDescription`, completion is a [`TaskStatus`] rather than a flag, and
/// there is an optional `priority` the local side does not keep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkTask {
    pub id: String,
    pub title: String,
    pub short_description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i32>,
    #[serde(default)]
    pub status: TaskStatus,
}

impl NetworkTask {
    /// Create an active task with no priority
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        short_description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            short_description: short_description.into(),
            priority: None,
            status: TaskStatus::Active,
        }
    }

    /// Set the status
    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    /// Set the priority
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = Some(priority);
        self
    }
}

/// Access to the remote task collection
///
/// The remote side only knows whole collections: it hands out everything it
/// has and accepts a full replacement.
#[async_trait]
pub trait NetworkDataSource: Send + Sync {
    /// Fetch every task the remote service holds
    async fn load_tasks(&self) -> Result<Vec<NetworkTask>>;

    /// Replace the remote collection with `tasks`
    async fn save_tasks(&self, tasks: Vec<NetworkTask>) -> Result<()>;
}
