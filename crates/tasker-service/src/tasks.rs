use tracing::{debug, info};
use uuid::Uuid;

use tasker_db::models::TaskRow;
use tasker_db::{ConstraintViolation, constraint_violation, queries};
use tasker_types::{Task, TaskStatus, TaskerError, UpdateOutcome};

use crate::users::user_not_found;
use crate::{Result, TaskerService, convert, validate};

impl TaskerService {
    /// Create a task for `user_id` and return its new id.
    ///
    /// Checks run in this order: the user exists (`NotFound`), the user has
    /// no task with the same trimmed name (`Conflict`), the name is not blank
    /// (`BadRequest`).
    pub async fn create_task(&self, user_id: i64, name: &str, description: &str) -> Result<Uuid> {
        let raw_name = name.trim().to_string();
        let description = description.trim().to_string();

        self.blocking(move |db| {
            let task_id = db.with_tx(|conn| -> Result<Uuid> {
                if !queries::user_exists(conn, user_id)? {
                    return Err(user_not_found(user_id));
                }
                if queries::task_name_taken(conn, user_id, &raw_name, None)? {
                    return Err(duplicate_task_name(&raw_name));
                }
                let name = validate::task_name(&raw_name)?;

                let task_id = Uuid::new_v4();
                queries::insert_task(conn, &task_id.to_string(), user_id, &name, &description)
                    .map_err(|e| match constraint_violation(&e) {
                        Some(ConstraintViolation::Unique) => duplicate_task_name(&name),
                        Some(ConstraintViolation::ForeignKey) => user_not_found(user_id),
                        _ => TaskerError::from(e),
                    })?;

                Ok(task_id)
            })?;

            info!("Task {} created for user {}", task_id, user_id);
            Ok(task_id)
        })
        .await
    }

    /// Every task owned by `user_id`, whatever its status, oldest first.
    /// A user with no tasks gets an empty list.
    pub async fn list_tasks(&self, user_id: i64) -> Result<Vec<Task>> {
        self.list(user_id, None).await
    }

    /// Tasks owned by `user_id` that are in `status`, oldest first.
    pub async fn list_tasks_by_status(&self, user_id: i64, status: TaskStatus) -> Result<Vec<Task>> {
        self.list(user_id, Some(status)).await
    }

    async fn list(&self, user_id: i64, status: Option<TaskStatus>) -> Result<Vec<Task>> {
        self.blocking(move |db| {
            let rows = db.with_conn(|conn| -> Result<Vec<TaskRow>> {
                if !queries::user_exists(conn, user_id)? {
                    return Err(user_not_found(user_id));
                }
                Ok(queries::query_tasks_for_user(
                    conn,
                    user_id,
                    status.map(TaskStatus::as_str),
                )?)
            })?;

            rows.into_iter().map(convert::task_from_row).collect()
        })
        .await
    }

    pub async fn get_task(&self, task_id: &str) -> Result<Task> {
        let task_id = validate::task_id(task_id)?;

        self.blocking(move |db| {
            let row = db
                .get_task_by_id(&task_id.to_string())?
                .ok_or_else(|| task_not_found(task_id))?;
            convert::task_from_row(row)
        })
        .await
    }

    /// Change the name and/or description of a task.
    ///
    /// Blank or absent fields are left as they are. With neither field given
    /// nothing is written and [`UpdateOutcome::NoChanges`] is returned; the
    /// task must still exist.
    pub async fn update_task(
        &self,
        task_id: &str,
        name: Option<&str>,
        description: Option<&str>,
    ) -> Result<UpdateOutcome> {
        let task_id = validate::task_id(task_id)?;
        let name = validate::provided(name);
        let description = validate::provided(description);

        self.blocking(move |db| {
            let id = task_id.to_string();

            let outcome = db.with_tx(|conn| -> Result<UpdateOutcome> {
                let current = queries::query_task_by_id(conn, &id)?
                    .ok_or_else(|| task_not_found(task_id))?;

                if name.is_none() && description.is_none() {
                    return Ok(UpdateOutcome::NoChanges);
                }

                let name = name.as_deref().map(validate::task_name).transpose()?;
                if let Some(name) = &name {
                    if queries::task_name_taken(conn, current.user_id, name, Some(id.as_str()))? {
                        return Err(duplicate_task_name(name));
                    }
                }

                queries::update_task_fields(conn, &id, name.as_deref(), description.as_deref())
                    .map_err(|e| match constraint_violation(&e) {
                        Some(ConstraintViolation::Unique) => {
                            duplicate_task_name(name.as_deref().unwrap_or_default())
                        }
                        _ => TaskerError::from(e),
                    })?;

                Ok(UpdateOutcome::Updated)
            })?;

            match outcome {
                UpdateOutcome::Updated => info!("Task {} updated", task_id),
                UpdateOutcome::NoChanges => debug!("No updates provided for task {}", task_id),
            }
            Ok(outcome)
        })
        .await
    }

    pub async fn delete_task(&self, task_id: &str) -> Result<()> {
        let task_id = validate::task_id(task_id)?;

        self.blocking(move |db| {
            db.with_tx(|conn| -> Result<()> {
                if queries::delete_task(conn, &task_id.to_string())? == 0 {
                    return Err(task_not_found(task_id));
                }
                Ok(())
            })?;

            info!("Task {} deleted", task_id);
            Ok(())
        })
        .await
    }

    /// Move a task to `Active` or `Archive` and return the status stored.
    /// Any other status is rejected before the database is touched.
    pub async fn change_task_status(&self, task_id: &str, status: &str) -> Result<TaskStatus> {
        let task_id = validate::task_id(task_id)?;
        let status: TaskStatus = status.parse()?;

        self.blocking(move |db| {
            db.with_tx(|conn| -> Result<()> {
                if queries::update_task_status(conn, &task_id.to_string(), status.as_str())? == 0 {
                    return Err(task_not_found(task_id));
                }
                Ok(())
            })?;

            info!("Task {} status changed to {}", task_id, status);
            Ok(status)
        })
        .await
    }
}

fn duplicate_task_name(name: &str) -> TaskerError {
    TaskerError::Conflict(format!("A task named '{name}' already exists for this user."))
}

fn task_not_found(task_id: Uuid) -> TaskerError {
    TaskerError::NotFound(format!("Task with ID {task_id} not found."))
}
