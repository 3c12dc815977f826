//! Type-safe task identifier

use serde::{Deserialize, Serialize};
use std::fmt;

/// Type-safe wrapper for task IDs
///
/// The same identifier is used by the domain, storage and remote shapes of a
/// task. New IDs are random UUIDs rendered as hyphenated lowercase strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    /// Create a TaskId from an existing identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh random identifier
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Get the underlying string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for TaskId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for TaskId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl AsRef<str> for TaskId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_task_id_creation() {
        let id = TaskId::new("PISA");
        assert_eq!(id.as_str(), "PISA");
        assert_eq!(id.to_string(), "PISA");
    }

    #[test]
    fn test_generated_ids_are_unique() {
        let ids: HashSet<TaskId> = (0..100).map(|_| TaskId::generate()).collect();
        assert_eq!(ids.len(), 100);
    }

    #[test]
    fn test_generated_id_is_uuid() {
        let id = TaskId::generate();
        assert!(!id.as_str().is_empty());
        assert!(uuid::Uuid::parse_str(id.as_str()).is_ok());
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let id = TaskId::from("abc");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"abc\"");
    }
}
