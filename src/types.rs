use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Task priority, persisted as an integer (1 = low, 2 = medium, 3 = high).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, Eq, PartialEq, PartialOrd, Ord)]
pub enum Priority {
    #[default]
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn as_i64(self) -> i64 {
        match self {
            Priority::Low => 1,
            Priority::Medium => 2,
            Priority::High => 3,
        }
    }

    pub fn from_i64(value: i64) -> Option<Self> {
        match value {
            1 => Some(Priority::Low),
            2 => Some(Priority::Medium),
            3 => Some(Priority::High),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct Board {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub created_at: String,
    pub updated_at: String,
    /// Columns ordered by position, loaded alongside the board row.
    #[serde(default)]
    pub columns: Vec<StatusColumn>,
    /// All tasks on the board; membership in a column is by id, not storage order.
    #[serde(default)]
    pub tasks: Vec<Task>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct StatusColumn {
    pub id: Uuid,
    pub board_id: Uuid,
    pub name: String,
    pub position: i64,
    /// Cosmetic hex color, consumed only by the renderer.
    pub color: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct Task {
    /// None until the first successful insert assigns an identifier.
    pub id: Option<Uuid>,
    pub board_id: Uuid,
    pub status_column_id: Uuid,
    pub title: String,
    pub description: String,
    pub position: i64,
    pub priority: Priority,
    pub due_date: Option<String>,
    pub assignee: String,
    pub tags: String,
    pub created_at: String,
    pub updated_at: String,
}

impl Task {
    /// A transient, not-yet-persisted task bound to a column. Identifier,
    /// position and timestamps are assigned by the store on create.
    pub fn new(
        board_id: Uuid,
        status_column_id: Uuid,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            board_id,
            status_column_id,
            title: title.into(),
            description: description.into(),
            position: 0,
            priority: Priority::Low,
            due_date: None,
            assignee: String::new(),
            tags: String::new(),
            created_at: String::new(),
            updated_at: String::new(),
        }
    }
}
