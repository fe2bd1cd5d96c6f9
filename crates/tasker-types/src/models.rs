use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::TaskerError;

/// Longest username accepted, matching the width of the users column.
pub const MAX_USERNAME_LEN: usize = 50;

/// Longest task name accepted, matching the width of the tasks column.
pub const MAX_TASK_NAME_LEN: usize = 255;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
}

/// Lifecycle status of a task. Tasks start `Active` and can move freely
/// between the two states.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskStatus {
    #[default]
    Active,
    Archive,
}

impl TaskStatus {
    /// Storage and display form, identical to the values the tasks table allows.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Archive => "Archive",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = TaskerError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "archive" => Ok(Self::Archive),
            _ => Err(TaskerError::BadRequest(format!(
                "Invalid status '{}'. Expected 'Active' or 'Archive'.",
                value.trim()
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub user_id: i64,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub status: TaskStatus,
}

/// Result of an update request that passed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    Updated,
    /// Neither a name nor a description was supplied; nothing was written.
    NoChanges,
}
