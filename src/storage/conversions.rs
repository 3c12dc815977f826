//! Type conversions between the three task shapes
//!
//! - model::Task <-> storage::LocalTask (field copy)
//! - storage::LocalTask <-> task_network::NetworkTask (renames and recodes)
//!
//! All conversions are total. The remote `priority` has no local
//! counterpart: it is dropped on the way in and left empty on the way out.

use crate::model::{Task, TaskId};
use crate::storage::LocalTask;
use task_network::{NetworkTask, TaskStatus};

/// Convert a domain task to its storage row
impl From<&Task> for LocalTask {
    fn from(task: &Task) -> Self {
        LocalTask {
            id: task.id.as_str().to_string(),
            title: task.title.clone(),
            description: task.description.clone(),
            is_completed: task.is_completed,
        }
    }
}

/// Convert a storage row to the domain task
impl From<&LocalTask> for Task {
    fn from(local: &LocalTask) -> Self {
        Task {
            id: TaskId::new(local.id.clone()),
            title: local.title.clone(),
            description: local.description.clone(),
            is_completed: local.is_completed,
        }
    }
}

/// Convert a remote task to a storage row
impl From<&NetworkTask> for LocalTask {
    fn from(network: &NetworkTask) -> Self {
        LocalTask {
            id: network.id.clone(),
            title: network.title.clone(),
            description: network.short_description.clone(),
            is_completed: status_to_completed(network.status),
        }
    }
}

/// Convert a storage row to a remote task
impl From<&LocalTask> for NetworkTask {
    fn from(local: &LocalTask) -> Self {
        NetworkTask {
            id: local.id.clone(),
            title: local.title.clone(),
            short_description: local.description.clone(),
            priority: None,
            status: completed_to_status(local.is_completed),
        }
    }
}

/// Only `Complete` counts as completed
pub fn status_to_completed(status: TaskStatus) -> bool {
    status == TaskStatus::Complete
}

pub fn completed_to_status(is_completed: bool) -> TaskStatus {
    if is_completed {
        TaskStatus::Complete
    } else {
        TaskStatus::Active
    }
}

/// Domain task to storage row
pub fn to_local(task: &Task) -> LocalTask {
    LocalTask::from(task)
}

pub fn tasks_to_local(tasks: &[Task]) -> Vec<LocalTask> {
    tasks.iter().map(LocalTask::from).collect()
}

/// Storage row to domain task
pub fn to_external(local: &LocalTask) -> Task {
    Task::from(local)
}

pub fn locals_to_external(locals: &[LocalTask]) -> Vec<Task> {
    locals.iter().map(Task::from).collect()
}

/// Storage row to remote task (priority is never set)
pub fn to_network(local: &LocalTask) -> NetworkTask {
    NetworkTask::from(local)
}

pub fn locals_to_network(locals: &[LocalTask]) -> Vec<NetworkTask> {
    locals.iter().map(NetworkTask::from).collect()
}

/// Remote task to storage row (priority is dropped)
pub fn network_to_local(network: &NetworkTask) -> LocalTask {
    LocalTask::from(network)
}

pub fn networks_to_local(networks: &[NetworkTask]) -> Vec<LocalTask> {
    networks.iter().map(LocalTask::from).collect()
}
