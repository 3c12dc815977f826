//! JSON Lines persistence for the remote task list
//!
//! One [`NetworkTask`] per line. Blank lines are skipped on read.

use crate::{NetworkTask, Result};
use std::path::Path;

/// Read every task from a JSONL file
pub async fn read_tasks(path: impl AsRef<Path>) -> Result<Vec<NetworkTask>> {
    let content = tokio::fs::read_to_string(path).await?;

    let mut tasks = Vec::new();
    for line in content.lines() {
        if line.trim().is_empty() {
            continue;
        }
        tasks.push(serde_json::from_str(line)?);
    }

    Ok(tasks)
}

/// Overwrite a JSONL file with `tasks`
pub async fn write_tasks(path: impl AsRef<Path>, tasks: &[NetworkTask]) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }

    let mut content = String::new();
    for task in tasks {
        content.push_str(&serde_json::to_string(task)?);
        content.push('\n');
    }

    tokio::fs::write(path, content).await?;
    Ok(())
}
