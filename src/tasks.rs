use chrono::{DateTime, Utc};
use serde::Serialize;

/// A single todo item as stored in the `tasks` table.
///
/// `created_at` is set once on insert; `updated_at` is refreshed on every
/// mutation (description edit or completion toggle), so
/// `updated_at >= created_at` always holds.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct Task {
    pub id: i64,
    pub description: String,
    pub is_completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Partial update applied by `TaskStore::update`. `None` fields are left
/// untouched.
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub description: Option<String>,
    pub is_completed: Option<bool>,
}

impl TaskPatch {
    pub fn description(text: impl Into<String>) -> Self {
        Self {
            description: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn completed(flag: bool) -> Self {
        Self {
            is_completed: Some(flag),
            ..Self::default()
        }
    }

    /// True when the patch would change nothing.
    pub fn is_empty(&self) -> bool {
        self.description.is_none() && self.is_completed.is_none()
    }
}

/// Listing orders used by the handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOrder {
    /// Newest first by creation time — the store default.
    NewestFirst,
    /// Incomplete tasks first, then newest id first within each group.
    /// The listing page uses this so unfinished work surfaces at the top.
    ActiveFirst,
}
