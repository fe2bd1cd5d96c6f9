pub mod error;
pub mod models;

pub use error::{ErrorResponse, TaskerError};
pub use models::{Task, TaskStatus, UpdateOutcome, User};
