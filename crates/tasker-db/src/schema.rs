use anyhow::Result;
use rusqlite::Connection;
use tracing::debug;

/// Outcome of [`bootstrap`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaStatus {
    Created,
    /// Both tables were already there. Not an error.
    AlreadyPresent,
}

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS users (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        username    TEXT NOT NULL UNIQUE
    );

    -- User ids start at 101
    INSERT INTO sqlite_sequence (name, seq)
        SELECT 'users', 100
        WHERE NOT EXISTS (SELECT 1 FROM sqlite_sequence WHERE name = 'users');

    CREATE TABLE IF NOT EXISTS tasks (
        id          TEXT PRIMARY KEY CHECK (length(id) = 36),
        user_id     INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        name        TEXT NOT NULL,
        description TEXT NOT NULL DEFAULT '',
        created_at  TEXT NOT NULL DEFAULT (strftime('%Y-%m-%d %H:%M:%f', 'now')),
        updated_at  TEXT NOT NULL DEFAULT (strftime('%Y-%m-%d %H:%M:%f', 'now')),
        status      TEXT NOT NULL DEFAULT 'Active' CHECK (status IN ('Active', 'Archive')),
        UNIQUE(user_id, name)
    );

    CREATE INDEX IF NOT EXISTS idx_tasks_user_status
        ON tasks(user_id, status);

    CREATE TRIGGER IF NOT EXISTS trg_tasks_touch_updated_at
        AFTER UPDATE OF name, description, status ON tasks
        FOR EACH ROW
    BEGIN
        UPDATE tasks
            SET updated_at = strftime('%Y-%m-%d %H:%M:%f', 'now')
            WHERE id = NEW.id;
    END;
";

/// Create the `users` and `tasks` tables, their index and trigger, if they
/// do not exist yet. Safe to run against an initialized database.
pub fn bootstrap(conn: &Connection) -> Result<SchemaStatus> {
    let existing: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN ('users', 'tasks')",
        [],
        |row| row.get(0),
    )?;

    conn.execute_batch(SCHEMA)?;

    if existing == 2 {
        debug!("users and tasks tables already exist");
        Ok(SchemaStatus::AlreadyPresent)
    } else {
        Ok(SchemaStatus::Created)
    }
}
