//! Background synchronization plumbing
//!
//! - **dispatcher**: execution context for CPU-bound work
//! - **scope**: supervised, long-lived scope for fire-and-forget jobs
//! - **metrics**: Prometheus counters for what those jobs did

mod dispatcher;
pub mod metrics;
mod scope;

pub use dispatcher::Dispatcher;
pub use scope::{
    SyncEvent, SyncScope, SyncStats, DEFAULT_EVENT_CHANNEL_CAPACITY, DEFAULT_SHUTDOWN_GRACE,
};
