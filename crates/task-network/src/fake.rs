//! In-memory stand-ins for the remote task service

use crate::{jsonl, Error, NetworkDataSource, NetworkTask, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;

/// Simulated round-trip time of the remote service
pub const SERVICE_LATENCY: Duration = Duration::from_millis(2000);

/// The tasks a fresh fake remote starts with
pub fn seed_tasks() -> Vec<NetworkTask> {
    vec![
        NetworkTask::new(
            "PISA",
            "Build tower in Pisa",
            "Ground looks good, no foundation work required.",
        ),
        NetworkTask::new(
            "TACOMA",
            "Finish bridge in Tacoma",
            "Found awesome girders at half the cost!",
        ),
    ]
}

/// Fake remote service holding its tasks in memory
///
/// Every call sleeps for the configured latency while holding the access
/// lock, so concurrent saves are applied one after another. With a backing
/// file the list is also written out as JSON lines on every save.
#[derive(Debug)]
pub struct FakeNetworkDataSource {
    tasks: Mutex<Vec<NetworkTask>>,
    latency: Duration,
    backing_file: Option<PathBuf>,
    saves: AtomicUsize,
}

impl Default for FakeNetworkDataSource {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeNetworkDataSource {
    /// Create a fake seeded with [`seed_tasks`] and the default latency
    pub fn new() -> Self {
        Self::with_tasks(seed_tasks())
    }

    /// Create a fake holding `tasks`
    pub fn with_tasks(tasks: Vec<NetworkTask>) -> Self {
        Self {
            tasks: Mutex::new(tasks),
            latency: SERVICE_LATENCY,
            backing_file: None,
            saves: AtomicUsize::new(0),
        }
    }

    /// Set the simulated latency
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Persist the list to a JSONL file
    ///
    /// If the file already exists its contents replace the in-memory list.
    pub async fn with_backing_file(mut self, path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        if tokio::fs::try_exists(&path).await? {
            let loaded = jsonl::read_tasks(&path).await?;
            tracing::debug!(path = %path.display(), tasks = loaded.len(), "Loaded remote tasks from file");
            *self.tasks.get_mut() = loaded;
        }

        self.backing_file = Some(path);
        Ok(self)
    }

    /// Current remote contents, without simulated latency
    pub async fn snapshot(&self) -> Vec<NetworkTask> {
        self.tasks.lock().await.clone()
    }

    /// Number of completed saves
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    async fn simulate_latency(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }
}

#[async_trait]
impl NetworkDataSource for FakeNetworkDataSource {
    async fn load_tasks(&self) -> Result<Vec<NetworkTask>> {
        let tasks = self.tasks.lock().await;
        self.simulate_latency().await;
        Ok(tasks.clone())
    }

    async fn save_tasks(&self, new_tasks: Vec<NetworkTask>) -> Result<()> {
        let mut tasks = self.tasks.lock().await;
        self.simulate_latency().await;

        if let Some(path) = &self.backing_file {
            jsonl::write_tasks(path, &new_tasks).await?;
        }

        tracing::debug!(tasks = new_tasks.len(), "Remote tasks replaced");
        *tasks = new_tasks;
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Remote service that is always down
#[derive(Debug, Clone)]
pub struct FailingNetworkDataSource {
    message: String,
}

impl FailingNetworkDataSource {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Default for FailingNetworkDataSource {
    fn default() -> Self {
        Self::new("connection refused")
    }
}

#[async_trait]
impl NetworkDataSource for FailingNetworkDataSource {
    async fn load_tasks(&self) -> Result<Vec<NetworkTask>> {
        Err(Error::Unavailable(self.message.clone()))
    }

    async fn save_tasks(&self, _tasks: Vec<NetworkTask>) -> Result<()> {
        Err(Error::Unavailable(self.message.clone()))
    }
}
