//! SQLite database holding the local task table

use crate::{Result, TaskSyncError};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio::sync::watch;

/// Current schema version, stamped into `PRAGMA user_version`
pub const SCHEMA_VERSION: i32 = 1;

/// Database configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Path to SQLite database file
    #[serde(default = "default_database_path")]
    pub path: PathBuf,

    /// Enable WAL mode for better concurrency
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

fn default_database_path() -> PathBuf {
    // Always use ~/.config for consistency across platforms (macOS, Linux)
    let mut path = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push(".config");
    path.push("tasksync");
    path.push("tasks.db");
    path
}

fn default_wal_mode() -> bool {
    true
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

impl DatabaseConfig {
    /// Config for a database file at `path`
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }
}

struct DatabaseInner {
    conn: Mutex<Connection>,
    path: Option<PathBuf>,
    /// Bumped after every committed write that touched rows
    invalidation: watch::Sender<u64>,
}

/// Handle to the local task database
///
/// Cheap to clone; all clones share one connection and one change counter.
/// Statements run on tokio's blocking pool, one at a time.
#[derive(Clone)]
pub struct TaskDatabase {
    inner: Arc<DatabaseInner>,
}

impl std::fmt::Debug for TaskDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskDatabase")
            .field("path", &self.inner.path)
            .finish_non_exhaustive()
    }
}

impl TaskDatabase {
    /// Open or create the database file
    pub fn open(config: &DatabaseConfig) -> Result<Self> {
        if config.path.as_os_str().is_empty() {
            return Err(TaskSyncError::Config(
                "Database path must not be empty".to_string(),
            ));
        }

        // Create parent directory if needed
        if let Some(parent) = config.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        tracing::info!(path = %config.path.display(), "Opening task database");

        let conn = Connection::open(&config.path)?;

        if config.wal_mode {
            conn.pragma_update(None, "journal_mode", "WAL")?;
        }

        Self::from_connection(conn, Some(config.path.clone()))
    }

    /// Open a private in-memory database
    pub fn open_in_memory() -> Result<Self> {
        tracing::debug!("Opening in-memory task database");
        Self::from_connection(Connection::open_in_memory()?, None)
    }

    fn from_connection(conn: Connection, path: Option<PathBuf>) -> Result<Self> {
        init_schema(&conn)?;

        let (invalidation, _) = watch::channel(0);
        Ok(Self {
            inner: Arc::new(DatabaseInner {
                conn: Mutex::new(conn),
                path,
                invalidation,
            }),
        })
    }

    /// Database file path, `None` when in memory
    pub fn path(&self) -> Option<&Path> {
        self.inner.path.as_deref()
    }

    /// DAO over the `task` table
    pub fn task_dao(&self) -> super::SqliteTaskDao {
        super::SqliteTaskDao::new(self.clone())
    }

    /// Schema version stored in the file
    pub async fn schema_version(&self) -> Result<i32> {
        self.call(|conn| Ok(conn.query_row("PRAGMA user_version", [], |row| row.get(0))?))
            .await
    }

    /// Run `f` against the connection on the blocking pool
    pub(crate) async fn call<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let inner = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || {
            let mut conn = inner
                .conn
                .lock()
                .map_err(|e| TaskSyncError::Storage(format!("Connection lock poisoned: {}", e)))?;
            f(&mut conn)
        })
        .await?
    }

    /// Wake every observer of the task table
    pub(crate) fn notify_changed(&self) {
        self.inner.invalidation.send_modify(|generation| {
            *generation = generation.wrapping_add(1);
        });
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<u64> {
        self.inner.invalidation.subscribe()
    }
}

/// Initialize database schema
fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS task (
            id TEXT PRIMARY KEY NOT NULL,
            title TEXT NOT NULL,
            description TEXT NOT NULL,
            is_completed INTEGER NOT NULL
        );
        "#,
    )?;

    let version: i32 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
    if version > SCHEMA_VERSION {
        return Err(TaskSyncError::Storage(format!(
            "Database schema version {} is newer than supported version {}",
            version, SCHEMA_VERSION
        )));
    }
    if version < SCHEMA_VERSION {
        conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;
    }

    Ok(())
}
