//! Storage-side task record

/// A row of the `task` table
///
/// Field-for-field the same as the domain task; kept separate so the table
/// layout can change without touching callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalTask {
    pub id: String,
    pub title: String,
    pub description: String,
    pub is_completed: bool,
}

impl LocalTask {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        is_completed: bool,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: description.into(),
            is_completed,
        }
    }

    /// Map a `SELECT id, title, description, is_completed` row
    pub(crate) fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            title: row.get(1)?,
            description: row.get(2)?,
            is_completed: row.get(3)?,
        })
    }
}
