/// Database row types: these map directly to SQLite rows.
/// Distinct from tasker-types models to keep the DB layer independent.

pub struct UserRow {
    pub id: i64,
    pub username: String,
}

pub struct TaskRow {
    pub id: String,
    pub user_id: i64,
    pub name: String,
    pub description: String,
    pub created_at: String,
    pub updated_at: String,
    pub status: String,
}
