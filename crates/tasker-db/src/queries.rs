use anyhow::Result;
use rusqlite::types::ToSql;
use rusqlite::{Connection, OptionalExtension, Row};

use crate::Database;
use crate::models::{TaskRow, UserRow};

const TASK_COLUMNS: &str = "id, user_id, name, description, created_at, updated_at, status";

impl Database {
    pub fn get_user_by_id(&self, id: i64) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user_by_id(conn, id))
    }

    pub fn get_task_by_id(&self, id: &str) -> Result<Option<TaskRow>> {
        self.with_conn(|conn| query_task_by_id(conn, id))
    }
}

// -- Users --

/// Insert a user and return the id the database assigned.
pub fn insert_user(conn: &Connection, username: &str) -> Result<i64> {
    conn.execute("INSERT INTO users (username) VALUES (?1)", [username])?;
    Ok(conn.last_insert_rowid())
}

pub fn user_exists(conn: &Connection, id: i64) -> Result<bool> {
    let found: Option<i64> = conn
        .query_row("SELECT 1 FROM users WHERE id = ?1", [id], |row| row.get(0))
        .optional()?;
    Ok(found.is_some())
}

/// Exact, case-sensitive match.
pub fn username_exists(conn: &Connection, username: &str) -> Result<bool> {
    let found: Option<i64> = conn
        .query_row("SELECT 1 FROM users WHERE username = ?1", [username], |row| {
            row.get(0)
        })
        .optional()?;
    Ok(found.is_some())
}

pub fn query_user_by_id(conn: &Connection, id: i64) -> Result<Option<UserRow>> {
    let mut stmt = conn.prepare("SELECT id, username FROM users WHERE id = ?1")?;

    let row = stmt
        .query_row([id], |row| {
            Ok(UserRow {
                id: row.get(0)?,
                username: row.get(1)?,
            })
        })
        .optional()?;

    Ok(row)
}

// -- Tasks --

pub fn insert_task(
    conn: &Connection,
    id: &str,
    user_id: i64,
    name: &str,
    description: &str,
) -> Result<()> {
    conn.execute(
        "INSERT INTO tasks (id, user_id, name, description) VALUES (?1, ?2, ?3, ?4)",
        rusqlite::params![id, user_id, name, description],
    )?;
    Ok(())
}

/// Whether `user_id` already owns a task called `name`, ignoring the task
/// `except_id` (the task being renamed, if any).
pub fn task_name_taken(
    conn: &Connection,
    user_id: i64,
    name: &str,
    except_id: Option<&str>,
) -> Result<bool> {
    let found: Option<i64> = conn
        .query_row(
            "SELECT 1 FROM tasks WHERE user_id = ?1 AND name = ?2 AND (?3 IS NULL OR id <> ?3)",
            rusqlite::params![user_id, name, except_id],
            |row| row.get(0),
        )
        .optional()?;
    Ok(found.is_some())
}

pub fn query_task_by_id(conn: &Connection, id: &str) -> Result<Option<TaskRow>> {
    let mut stmt = conn.prepare(&format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1"))?;
    let row = stmt.query_row([id], task_from_row).optional()?;
    Ok(row)
}

/// All tasks owned by `user_id`, oldest first. `status` narrows the result
/// to one lifecycle state.
pub fn query_tasks_for_user(
    conn: &Connection,
    user_id: i64,
    status: Option<&str>,
) -> Result<Vec<TaskRow>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {TASK_COLUMNS} FROM tasks
         WHERE user_id = ?1 AND (?2 IS NULL OR status = ?2)
         ORDER BY created_at, id"
    ))?;

    let rows = stmt
        .query_map(rusqlite::params![user_id, status], task_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

/// Set whichever of `name` and `description` are given. Returns the number
/// of rows changed; with neither field given nothing is executed.
pub fn update_task_fields(
    conn: &Connection,
    id: &str,
    name: Option<&str>,
    description: Option<&str>,
) -> Result<usize> {
    let mut assignments: Vec<String> = Vec::new();
    let mut params: Vec<&dyn ToSql> = Vec::new();

    if let Some(name) = name.as_ref() {
        params.push(name);
        assignments.push(format!("name = ?{}", params.len()));
    }
    if let Some(description) = description.as_ref() {
        params.push(description);
        assignments.push(format!("description = ?{}", params.len()));
    }

    if assignments.is_empty() {
        return Ok(0);
    }

    params.push(&id);
    let sql = format!(
        "UPDATE tasks SET {} WHERE id = ?{}",
        assignments.join(", "),
        params.len()
    );

    let changed = conn.execute(&sql, params.as_slice())?;
    Ok(changed)
}

pub fn update_task_status(conn: &Connection, id: &str, status: &str) -> Result<usize> {
    let changed = conn.execute(
        "UPDATE tasks SET status = ?1 WHERE id = ?2",
        rusqlite::params![status, id],
    )?;
    Ok(changed)
}

pub fn delete_task(conn: &Connection, id: &str) -> Result<usize> {
    let changed = conn.execute("DELETE FROM tasks WHERE id = ?1", [id])?;
    Ok(changed)
}

fn task_from_row(row: &Row<'_>) -> rusqlite::Result<TaskRow> {
    Ok(TaskRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        description: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
        status: row.get(6)?,
    })
}
