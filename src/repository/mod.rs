//! Repository layer
//!
//! The one place callers go for tasks. Reads come from local storage; writes
//! land locally first and are mirrored to the remote service in the
//! background.

mod task_repository;

pub use task_repository::{TaskRepository, PUSH_JOB};
