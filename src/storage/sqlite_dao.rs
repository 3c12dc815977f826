//! SQLite implementation of [`TaskDao`]

use super::{LocalTask, TaskDao, TaskDatabase, TaskStream};
use crate::Result;
use async_trait::async_trait;
use futures::StreamExt;
use rusqlite::{params, Connection};

const SELECT_ALL: &str =
    "SELECT id, title, description, is_completed FROM task ORDER BY rowid";

const UPSERT: &str = r#"
    INSERT INTO task (id, title, description, is_completed)
    VALUES (?1, ?2, ?3, ?4)
    ON CONFLICT(id) DO UPDATE SET
        title = excluded.title,
        description = excluded.description,
        is_completed = excluded.is_completed
"#;

/// Task DAO backed by [`TaskDatabase`]
///
/// Writes bump the database's change counter; `observe_all` streams re-query
/// whenever the counter moves. Bursts of writes may be coalesced into one
/// emission.
#[derive(Debug, Clone)]
pub struct SqliteTaskDao {
    db: TaskDatabase,
}

impl SqliteTaskDao {
    pub fn new(db: TaskDatabase) -> Self {
        Self { db }
    }
}

fn query_all(conn: &Connection) -> Result<Vec<LocalTask>> {
    let mut stmt = conn.prepare_cached(SELECT_ALL)?;
    let rows = stmt.query_map([], LocalTask::from_row)?;

    let mut tasks = Vec::new();
    for row in rows {
        tasks.push(row?);
    }
    Ok(tasks)
}

fn upsert_row(conn: &Connection, task: &LocalTask) -> Result<()> {
    conn.prepare_cached(UPSERT)?.execute(params![
        task.id,
        task.title,
        task.description,
        task.is_completed,
    ])?;
    Ok(())
}

#[async_trait]
impl TaskDao for SqliteTaskDao {
    fn observe_all(&self) -> TaskStream<Vec<LocalTask>> {
        // Subscribe now so writes made before the first poll are not missed
        let rx = self.db.subscribe();
        let db = self.db.clone();

        futures::stream::unfold((db, rx, true), |(db, mut rx, first)| async move {
            if first {
                rx.borrow_and_update();
            } else {
                // The sender lives inside the database, so this only fails
                // once every handle is gone
                rx.changed().await.ok()?;
            }
            let result = db.call(|conn| query_all(conn)).await;
            Some((result, (db, rx, false)))
        })
        .boxed()
    }

    async fn get_all(&self) -> Result<Vec<LocalTask>> {
        self.db.call(|conn| query_all(conn)).await
    }

    async fn upsert(&self, task: LocalTask) -> Result<()> {
        tracing::debug!(task_id = %task.id, "Upserting task");
        self.db.call(move |conn| upsert_row(conn, &task)).await?;
        self.db.notify_changed();
        Ok(())
    }

    async fn upsert_all(&self, tasks: Vec<LocalTask>) -> Result<()> {
        if tasks.is_empty() {
            return Ok(());
        }

        tracing::debug!(count = tasks.len(), "Upserting tasks");
        self.db
            .call(move |conn| {
                let tx = conn.transaction()?;
                for task in &tasks {
                    upsert_row(&tx, task)?;
                }
                tx.commit()?;
                Ok(())
            })
            .await?;
        self.db.notify_changed();
        Ok(())
    }

    async fn update_completed(&self, task_id: &str, completed: bool) -> Result<usize> {
        let id = task_id.to_string();
        let changed = self
            .db
            .call(move |conn| {
                Ok(conn.execute(
                    "UPDATE task SET is_completed = ?1 WHERE id = ?2",
                    params![completed, id],
                )?)
            })
            .await?;

        tracing::debug!(task_id, completed, changed, "Updated completed flag");
        if changed > 0 {
            self.db.notify_changed();
        }
        Ok(changed)
    }

    async fn delete_all(&self) -> Result<usize> {
        let removed = self
            .db
            .call(|conn| Ok(conn.execute("DELETE FROM task", [])?))
            .await?;

        tracing::debug!(removed, "Deleted all tasks");
        if removed > 0 {
            self.db.notify_changed();
        }
        Ok(removed)
    }
}
