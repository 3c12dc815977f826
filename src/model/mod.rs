//! Domain model
//!
//! The task shape handed to callers outside the data layer.

mod ids;
mod task;

pub use ids::TaskId;
pub use task::Task;
