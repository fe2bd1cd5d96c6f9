use uuid::Uuid;

use tasker_types::TaskerError;
use tasker_types::models::{MAX_TASK_NAME_LEN, MAX_USERNAME_LEN};

use crate::Result;

/// Trimmed username, rejected if empty, all digits, or too long.
pub(crate) fn username(raw: &str) -> Result<String> {
    let username = raw.trim();

    if username.is_empty() {
        return Err(TaskerError::BadRequest("Username cannot be empty.".to_string()));
    }
    if username.chars().all(char::is_numeric) {
        return Err(TaskerError::BadRequest(
            "Username cannot consist only of digits.".to_string(),
        ));
    }
    if username.chars().count() > MAX_USERNAME_LEN {
        return Err(TaskerError::BadRequest(format!(
            "Username cannot be longer than {MAX_USERNAME_LEN} characters."
        )));
    }

    Ok(username.to_string())
}

/// Trimmed task name, rejected if empty or too long.
pub(crate) fn task_name(raw: &str) -> Result<String> {
    let name = raw.trim();

    if name.is_empty() {
        return Err(TaskerError::BadRequest("Task name cannot be empty.".to_string()));
    }
    if name.chars().count() > MAX_TASK_NAME_LEN {
        return Err(TaskerError::BadRequest(format!(
            "Task name cannot be longer than {MAX_TASK_NAME_LEN} characters."
        )));
    }

    Ok(name.to_string())
}

pub(crate) fn task_id(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw.trim())
        .map_err(|_| TaskerError::BadRequest(format!("Invalid task ID format: '{}'.", raw.trim())))
}

/// `None` for absent or blank input, otherwise the trimmed text.
pub(crate) fn provided(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
