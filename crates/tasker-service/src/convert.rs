use chrono::{DateTime, NaiveDateTime, Utc};
use tracing::warn;
use uuid::Uuid;

use tasker_db::models::{TaskRow, UserRow};
use tasker_types::{Task, TaskStatus, TaskerError, User};

use crate::Result;

pub(crate) fn user_from_row(row: UserRow) -> User {
    User {
        id: row.id,
        username: row.username,
    }
}

/// A row that fails to convert is corrupt storage, reported as `Internal`.
pub(crate) fn task_from_row(row: TaskRow) -> Result<Task> {
    let id: Uuid = row.id.parse().map_err(|e| {
        warn!("Corrupt task id '{}': {}", row.id, e);
        corrupt()
    })?;

    let status: TaskStatus = row.status.parse().map_err(|_| {
        warn!("Corrupt status '{}' on task '{}'", row.status, row.id);
        corrupt()
    })?;

    let created_at = parse_timestamp(&row.created_at).ok_or_else(|| {
        warn!("Corrupt created_at '{}' on task '{}'", row.created_at, row.id);
        corrupt()
    })?;
    let updated_at = parse_timestamp(&row.updated_at).ok_or_else(|| {
        warn!("Corrupt updated_at '{}' on task '{}'", row.updated_at, row.id);
        corrupt()
    })?;

    Ok(Task {
        id,
        user_id: row.user_id,
        name: row.name,
        description: row.description,
        created_at,
        updated_at,
        status,
    })
}

fn corrupt() -> TaskerError {
    TaskerError::Internal("Stored task data is corrupt.".to_string())
}

/// SQLite stores timestamps as "YYYY-MM-DD HH:MM:SS[.fff]" without a
/// timezone; they are UTC.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    raw.parse::<DateTime<Utc>>()
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f")
                .ok()
                .map(|ndt| ndt.and_utc())
        })
}
