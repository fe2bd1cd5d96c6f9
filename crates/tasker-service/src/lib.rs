//! User and task operations over the tasker database.
//!
//! Every operation validates its input, opens one connection for its own use,
//! and reports failures as [`TaskerError`]. Blocking database work runs on
//! tokio's blocking pool.

mod convert;
pub mod tasks;
pub mod users;
mod validate;

use std::sync::Arc;

use tracing::error;

use tasker_db::Database;
use tasker_types::TaskerError;

pub type Result<T> = std::result::Result<T, TaskerError>;

#[derive(Clone)]
pub struct TaskerService {
    db: Arc<Database>,
}

impl TaskerService {
    pub fn new(db: Database) -> Self {
        Self { db: Arc::new(db) }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Run blocking database work off the async runtime.
    async fn blocking<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Database) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let db = self.db.clone();
        tokio::task::spawn_blocking(move || f(&db))
            .await
            .map_err(|e| {
                error!("spawn_blocking join error: {}", e);
                TaskerError::Internal("An unexpected error occurred.".to_string())
            })?
    }
}
