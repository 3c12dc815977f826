//! Storage access contract for the task table

use super::LocalTask;
use crate::Result;
use async_trait::async_trait;
use futures::stream::BoxStream;

/// A live stream of query results
///
/// Emits the current value first, then a fresh value after every change. It
/// does not end on its own; drop it to stop observing.
pub type TaskStream<T> = BoxStream<'static, Result<T>>;

/// Data access object for the `task` table
#[async_trait]
pub trait TaskDao: Send + Sync {
    /// Observe every task row, in insertion order
    fn observe_all(&self) -> TaskStream<Vec<LocalTask>>;

    /// One-off read of every task row, in insertion order
    async fn get_all(&self) -> Result<Vec<LocalTask>>;

    /// Insert a task, or replace the row with the same id
    async fn upsert(&self, task: LocalTask) -> Result<()>;

    /// Upsert every task in one transaction
    async fn upsert_all(&self, tasks: Vec<LocalTask>) -> Result<()>;

    /// Set the completed flag of one task
    ///
    /// Returns the number of rows changed; an unknown id changes nothing and
    /// is not an error.
    async fn update_completed(&self, task_id: &str, completed: bool) -> Result<usize>;

    /// Delete every task, returning how many were removed
    async fn delete_all(&self) -> Result<usize>;
}
