use tracing::info;

use tasker_db::{ConstraintViolation, constraint_violation, queries};
use tasker_types::{TaskerError, User};

use crate::{Result, TaskerService, convert, validate};

impl TaskerService {
    /// Register a user and return the id the database assigned.
    ///
    /// Fails with `BadRequest` for an empty, all-digit or overlong username
    /// and with `Conflict` when the name is already taken (exact match).
    pub async fn create_user(&self, username: &str) -> Result<i64> {
        let username = validate::username(username)?;

        self.blocking(move |db| {
            let id = db.with_tx(|conn| -> Result<i64> {
                if queries::username_exists(conn, &username)? {
                    return Err(duplicate_username(&username));
                }

                queries::insert_user(conn, &username).map_err(|e| {
                    match constraint_violation(&e) {
                        Some(ConstraintViolation::Unique) => duplicate_username(&username),
                        _ => TaskerError::from(e),
                    }
                })
            })?;

            info!("User '{}' created with id {}", username, id);
            Ok(id)
        })
        .await
    }

    pub async fn get_user(&self, user_id: i64) -> Result<User> {
        self.blocking(move |db| {
            db.get_user_by_id(user_id)?
                .map(convert::user_from_row)
                .ok_or_else(|| user_not_found(user_id))
        })
        .await
    }
}

fn duplicate_username(username: &str) -> TaskerError {
    TaskerError::Conflict(format!("Username '{username}' already exists."))
}

pub(crate) fn user_not_found(user_id: i64) -> TaskerError {
    TaskerError::NotFound(format!("User with ID {user_id} not found."))
}
