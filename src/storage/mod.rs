//! Storage layer
//!
//! The local SQLite store is the single source of truth for reads. This
//! module owns the database handle, the task DAO and the conversions between
//! the storage, domain and remote task shapes.

mod conversions;
mod dao;
mod database;
mod local_task;
mod sqlite_dao;

pub use conversions::{
    completed_to_status, locals_to_external, locals_to_network, network_to_local,
    networks_to_local, status_to_completed, tasks_to_local, to_external, to_local, to_network,
};
pub use dao::{TaskDao, TaskStream};
pub use database::{DatabaseConfig, TaskDatabase, SCHEMA_VERSION};
pub use local_task::LocalTask;
pub use sqlite_dao::SqliteTaskDao;
