use std::io::Write;

use anyhow::Result;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};
use tracing::debug;

use tasker_service::TaskerService;
use tasker_types::{Task, TaskerError, UpdateOutcome};

const MENU: &str = "
Choose an option:
1. Create User
2. Create Task
3. List All Tasks
4. Get a Task
5. Update Task
6. Delete Task
7. Change Task Status
8. Exit";

enum Flow {
    Continue,
    Exit,
}

/// Interactive menu over a [`TaskerService`]. Operation failures are printed
/// as `{"error", "status"}` and the loop carries on; only I/O errors on the
/// terminal end it early.
pub struct Repl<R, W> {
    service: TaskerService,
    lines: Lines<R>,
    out: W,
}

impl<R, W> Repl<R, W>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    pub fn new(service: TaskerService, input: R, out: W) -> Self {
        Self {
            service,
            lines: input.lines(),
            out,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        writeln!(self.out, "Welcome to the Task Management System!")?;

        loop {
            writeln!(self.out, "{MENU}")?;
            let Some(choice) = self.prompt("Enter your choice: ").await? else {
                break;
            };

            if let Flow::Exit = self.dispatch(choice.trim()).await? {
                break;
            }
        }

        writeln!(self.out, "Goodbye!")?;
        self.out.flush()?;
        Ok(())
    }

    /// Print `label` and read one line. `None` at end of input.
    async fn prompt(&mut self, label: &str) -> Result<Option<String>> {
        write!(self.out, "{label}")?;
        self.out.flush()?;
        Ok(self.lines.next_line().await?)
    }

    async fn dispatch(&mut self, choice: &str) -> Result<Flow> {
        debug!("Menu choice '{}'", choice);
        match choice {
            "1" => self.create_user().await,
            "2" => self.create_task().await,
            "3" => self.list_tasks().await,
            "4" => self.get_task().await,
            "5" => self.update_task().await,
            "6" => self.delete_task().await,
            "7" => self.change_status().await,
            "8" => Ok(Flow::Exit),
            _ => {
                writeln!(self.out, "Invalid choice. Please try again.")?;
                Ok(Flow::Continue)
            }
        }
    }

    async fn create_user(&mut self) -> Result<Flow> {
        let Some(username) = self.prompt("Enter username: ").await? else {
            return Ok(Flow::Exit);
        };

        match self.service.create_user(&username).await {
            Ok(id) => writeln!(
                self.out,
                "User {} created successfully with ID {}",
                username.trim(),
                id
            )?,
            Err(e) => self.report(&e)?,
        }
        Ok(Flow::Continue)
    }

    async fn create_task(&mut self) -> Result<Flow> {
        let Some(user_id) = self.prompt("Enter user ID: ").await? else {
            return Ok(Flow::Exit);
        };
        let Some(name) = self.prompt("Enter task name: ").await? else {
            return Ok(Flow::Exit);
        };
        let Some(description) = self.prompt("Enter task description: ").await? else {
            return Ok(Flow::Exit);
        };

        let result = match parse_user_id(&user_id) {
            Ok(user_id) => self.service.create_task(user_id, &name, &description).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(id) => writeln!(
                self.out,
                "Task '{}' created successfully with ID {}",
                name.trim(),
                id
            )?,
            Err(e) => self.report(&e)?,
        }
        Ok(Flow::Continue)
    }

    async fn list_tasks(&mut self) -> Result<Flow> {
        let Some(user_id) = self.prompt("Enter user ID to list tasks: ").await? else {
            return Ok(Flow::Exit);
        };

        let result = match parse_user_id(&user_id) {
            Ok(user_id) => self.service.list_tasks(user_id).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(tasks) if tasks.is_empty() => writeln!(self.out, "No tasks found.")?,
            Ok(tasks) => {
                for task in &tasks {
                    self.print_task(task)?;
                }
            }
            Err(e) => self.report(&e)?,
        }
        Ok(Flow::Continue)
    }

    async fn get_task(&mut self) -> Result<Flow> {
        let Some(task_id) = self.prompt("Enter task ID to get details: ").await? else {
            return Ok(Flow::Exit);
        };

        match self.service.get_task(&task_id).await {
            Ok(task) => self.print_task(&task)?,
            Err(e) => self.report(&e)?,
        }
        Ok(Flow::Continue)
    }

    async fn update_task(&mut self) -> Result<Flow> {
        let Some(task_id) = self.prompt("Enter task ID to update: ").await? else {
            return Ok(Flow::Exit);
        };
        let Some(name) = self.prompt("Enter new task name: ").await? else {
            return Ok(Flow::Exit);
        };
        let Some(description) = self.prompt("Enter new task description: ").await? else {
            return Ok(Flow::Exit);
        };

        match self
            .service
            .update_task(&task_id, Some(&name), Some(&description))
            .await
        {
            Ok(UpdateOutcome::Updated) => {
                writeln!(self.out, "Task {} updated successfully.", task_id.trim())?
            }
            Ok(UpdateOutcome::NoChanges) => writeln!(self.out, "No updates provided.")?,
            Err(e) => self.report(&e)?,
        }
        Ok(Flow::Continue)
    }

    async fn delete_task(&mut self) -> Result<Flow> {
        let Some(task_id) = self.prompt("Enter task ID to delete: ").await? else {
            return Ok(Flow::Exit);
        };

        match self.service.delete_task(&task_id).await {
            Ok(()) => writeln!(self.out, "Task {} deleted", task_id.trim())?,
            Err(e) => self.report(&e)?,
        }
        Ok(Flow::Continue)
    }

    async fn change_status(&mut self) -> Result<Flow> {
        let Some(task_id) = self.prompt("Enter task ID to change status: ").await? else {
            return Ok(Flow::Exit);
        };
        let Some(status) = self.prompt("Enter new status (Active/Archive): ").await? else {
            return Ok(Flow::Exit);
        };

        match self.service.change_task_status(&task_id, &status).await {
            Ok(status) => writeln!(
                self.out,
                "Task {} status updated to {}",
                task_id.trim(),
                status
            )?,
            Err(e) => self.report(&e)?,
        }
        Ok(Flow::Continue)
    }

    fn print_task(&mut self, task: &Task) -> Result<()> {
        writeln!(
            self.out,
            "Task ID: {}, Name: {}, Description: {}, Status: {}",
            task.id, task.name, task.description, task.status
        )?;
        Ok(())
    }

    fn report(&mut self, err: &TaskerError) -> Result<()> {
        writeln!(self.out, "{}", serde_json::to_string(&err.to_response())?)?;
        Ok(())
    }
}

fn parse_user_id(raw: &str) -> Result<i64, TaskerError> {
    raw.trim()
        .parse()
        .map_err(|_| TaskerError::BadRequest(format!("User ID must be an integer, got '{}'.", raw.trim())))
}
