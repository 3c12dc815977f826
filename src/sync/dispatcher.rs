//! Execution context for CPU-bound work

use crate::{Result, TaskSyncError};
use tokio::runtime::Handle;

/// Runs CPU-bound closures off the calling task
///
/// Work goes to the blocking pool of the runtime the dispatcher was built
/// with, so identifier generation and list conversion never stall the
/// caller's executor thread.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    handle: Handle,
}

impl Dispatcher {
    /// Dispatch onto the runtime behind `handle`
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Dispatch onto the ambient runtime
    ///
    /// # Panics
    /// Panics when called outside a tokio runtime.
    pub fn current() -> Self {
        Self::new(Handle::current())
    }

    /// Dispatch onto the ambient runtime, if there is one
    pub fn try_current() -> Result<Self> {
        Handle::try_current()
            .map(Self::new)
            .map_err(|e| TaskSyncError::Other(format!("No tokio runtime available: {}", e)))
    }

    /// Run `f` on the blocking pool and wait for its result
    pub async fn run<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        Ok(self.handle.spawn_blocking(f).await?)
    }
}
