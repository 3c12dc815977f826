//! Task data structure

use super::TaskId;
use serde::{Deserialize, Serialize};

/// A task as seen by callers of the data layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub is_completed: bool,
}

impl Task {
    /// Create an incomplete task
    pub fn new(
        id: impl Into<TaskId>,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: description.into(),
            is_completed: false,
        }
    }

    /// Mark the task completed or active
    pub fn with_completed(mut self, completed: bool) -> Self {
        self.is_completed = completed;
        self
    }

    /// Title to show in lists; falls back to the description when the title is blank
    pub fn title_for_list(&self) -> &str {
        if self.title.trim().is_empty() {
            &self.description
        } else {
            &self.title
        }
    }

    /// Whether the task is still open
    pub fn is_active(&self) -> bool {
        !self.is_completed
    }
}
