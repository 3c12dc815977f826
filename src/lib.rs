//! tasksync - offline-first task storage with background remote sync
//!
//! Tasks live in a local SQLite table that is the single source of truth for
//! reads. Every local write is mirrored to a remote task service in the
//! background; a refresh replaces the local table with the remote contents.
//!
//! # Architecture
//!
//! - **model**: Domain task type and ids
//! - **storage**: Local task rows, conversions, the SQLite DAO
//! - **repository**: TaskRepository, the API callers use
//! - **sync**: Dispatcher and the supervised scope background pushes run on
//! - **config**: YAML configuration and validation
//!
//! The remote side (wire type, data source trait, fake service) lives in the
//! `task-network` crate.

// Core modules
pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod storage;

// Components
pub mod repository;
pub mod sync;

// Re-exports
pub use error::{Result, TaskSyncError};
pub use model::{Task, TaskId};
pub use repository::TaskRepository;
