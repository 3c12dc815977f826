//! TaskRepository - single source of truth for tasks
//!
//! Local storage is authoritative for reads. Every local write is followed by
//! a fire-and-forget push of the *whole* local collection to the remote
//! service, launched on the injected [`SyncScope`]. `refresh` goes the other
//! way and overwrites local storage with whatever the remote holds.

use crate::model::{Task, TaskId};
use crate::storage::{
    locals_to_external, locals_to_network, networks_to_local, to_local, TaskDao, TaskStream,
};
use crate::sync::{metrics, Dispatcher, SyncScope};
use crate::Result;
use futures::StreamExt;
use std::sync::Arc;
use task_network::NetworkDataSource;

/// Label of the background push job on the sync scope
pub const PUSH_JOB: &str = "push-to-network";

/// Repository mediating between the local task table and the remote service
///
/// All collaborators are injected; the repository creates none of them.
#[derive(Clone)]
pub struct TaskRepository {
    local: Arc<dyn TaskDao>,
    network: Arc<dyn NetworkDataSource>,
    dispatcher: Dispatcher,
    scope: SyncScope,
}

impl std::fmt::Debug for TaskRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskRepository")
            .field("dispatcher", &self.dispatcher)
            .field("scope", &self.scope)
            .finish_non_exhaustive()
    }
}

impl TaskRepository {
    /// Create a repository
    ///
    /// # Arguments
    /// * `local` - DAO over the local task table
    /// * `network` - Remote task service
    /// * `dispatcher` - Where CPU-bound work (id generation, list conversion) runs
    /// * `scope` - Long-lived scope that owns the background pushes
    pub fn new(
        local: Arc<dyn TaskDao>,
        network: Arc<dyn NetworkDataSource>,
        dispatcher: Dispatcher,
        scope: SyncScope,
    ) -> Self {
        Self {
            local,
            network,
            dispatcher,
            scope,
        }
    }

    /// The scope background pushes run on
    pub fn scope(&self) -> &SyncScope {
        &self.scope
    }

    // --- Reading operations ---

    /// Observe every task, re-emitting whenever local storage changes
    pub fn observe_all(&self) -> TaskStream<Vec<Task>> {
        self.local
            .observe_all()
            .map(|result| result.map(|locals| locals_to_external(&locals)))
            .boxed()
    }

    /// Every task currently in local storage
    pub async fn get_all(&self) -> Result<Vec<Task>> {
        let locals = self.local.get_all().await?;
        Ok(locals_to_external(&locals))
    }

    // --- Writing operations ---

    /// Create an incomplete task and return its new id
    ///
    /// Returns as soon as the task is stored locally; the remote push runs
    /// in the background.
    pub async fn create(
        &self,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<TaskId> {
        // Id generation may be expensive, keep it off the caller
        let task_id = self.dispatcher.run(TaskId::generate).await?;
        let task = Task::new(task_id.clone(), title, description);

        self.local.upsert(to_local(&task)).await?;
        tracing::info!(task_id = %task_id, "Task created");

        self.save_tasks_to_network();
        Ok(task_id)
    }

    /// Mark a task completed
    ///
    /// An unknown id leaves storage untouched and is not an error.
    pub async fn complete(&self, task_id: &TaskId) -> Result<()> {
        let changed = self.local.update_completed(task_id.as_str(), true).await?;
        if changed == 0 {
            tracing::debug!(task_id = %task_id, "Complete requested for unknown task");
        } else {
            tracing::info!(task_id = %task_id, "Task completed");
        }

        self.save_tasks_to_network();
        Ok(())
    }

    // --- Synchronization ---

    /// Replace local storage with the remote collection
    ///
    /// Destructive: local changes that never reached the remote are lost.
    pub async fn refresh(&self) -> Result<()> {
        let remote_tasks = self.network.load_tasks().await?;
        let locals = self
            .dispatcher
            .run(move || networks_to_local(&remote_tasks))
            .await?;

        let removed = self.local.delete_all().await?;
        let count = locals.len();
        self.local.upsert_all(locals).await?;

        tracing::info!(removed, loaded = count, "Refreshed tasks from network");
        Ok(())
    }

    /// Push the full local snapshot to the remote without waiting
    ///
    /// The snapshot is read when the job runs, not when it is queued, so a
    /// burst of writes still ends with the latest state on the remote.
    fn save_tasks_to_network(&self) {
        let local = Arc::clone(&self.local);
        let network = Arc::clone(&self.network);
        let dispatcher = self.dispatcher.clone();

        self.scope.launch(PUSH_JOB, async move {
            let snapshot = local.get_all().await?;
            let network_tasks = dispatcher
                .run(move || locals_to_network(&snapshot))
                .await?;

            let count = network_tasks.len();
            network.save_tasks(network_tasks).await?;

            metrics::record_push_size(count);
            tracing::debug!(tasks = count, "Pushed tasks to network");
            Ok(())
        });
    }
}
