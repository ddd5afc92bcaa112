//! Task CLI commands
//!
//! Implements CLI commands for task management. Every mutation goes through
//! [`TaskService`], which records the audit trail.

use chrono::NaiveDate;
use clap::Subcommand;

use crate::display::{format_task_details, format_task_list};
use crate::error::TrailResult;
use crate::models::{Priority, TaskStatus, UserId};
use crate::services::{Actor, NewTask, TaskFilter, TaskPatch, TaskService, TaskSort, UserService};
use crate::storage::Storage;

/// Task subcommands
#[derive(Subcommand)]
pub enum TaskCommands {
    /// Create a task
    Add {
        /// Task title
        title: String,
        /// Longer description
        #[arg(short, long)]
        description: Option<String>,
        /// Initial status (pending, in-progress, completed)
        #[arg(short, long)]
        status: Option<TaskStatus>,
        /// Priority (low, medium, high)
        #[arg(short, long)]
        priority: Option<Priority>,
        /// Due date (YYYY-MM-DD)
        #[arg(long)]
        due: Option<NaiveDate>,
        /// Assign to a user by email or ID (admins only)
        #[arg(long)]
        owner: Option<String>,
    },
    /// List tasks
    List {
        /// Only tasks with this status
        #[arg(short, long)]
        status: Option<TaskStatus>,
        /// Only tasks with this priority
        #[arg(short, long)]
        priority: Option<Priority>,
        /// Sort by created_at, due_date, priority or title
        #[arg(long, default_value = "created_at")]
        sort: TaskSort,
        /// Sort ascending instead of descending
        #[arg(long)]
        asc: bool,
    },
    /// Show task details
    Show {
        /// Task ID
        task: String,
    },
    /// Update a task
    Update {
        /// Task ID
        task: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long, conflicts_with = "clear_description")]
        description: Option<String>,
        #[arg(long)]
        clear_description: bool,
        #[arg(long, conflicts_with = "clear_status")]
        status: Option<TaskStatus>,
        #[arg(long)]
        clear_status: bool,
        #[arg(long, conflicts_with = "clear_priority")]
        priority: Option<Priority>,
        #[arg(long)]
        clear_priority: bool,
        /// Due date (YYYY-MM-DD)
        #[arg(long, conflicts_with = "clear_due")]
        due: Option<NaiveDate>,
        #[arg(long)]
        clear_due: bool,
        /// Reassign to a user by email or ID (admins only)
        #[arg(long, conflicts_with = "unassign")]
        owner: Option<String>,
        /// Remove the owner (admins only)
        #[arg(long)]
        unassign: bool,
    },
    /// Delete a task and its audit trail
    Delete {
        /// Task ID
        task: String,
        /// Skip confirmation
        #[arg(short, long)]
        force: bool,
    },
}

/// Pick `Some(Some(v))` for a new value, `Some(None)` for a clear flag
fn patch_field<T>(value: Option<T>, clear: bool) -> Option<Option<T>> {
    if clear {
        Some(None)
    } else {
        value.map(Some)
    }
}

/// Handle a task command
pub fn handle_task_command(storage: &Storage, actor: Actor<'_>, cmd: TaskCommands) -> TrailResult<()> {
    let service = TaskService::new(storage);
    let users = UserService::new(storage);

    let resolve_owner = |identifier: &str| -> TrailResult<UserId> {
        Ok(users.require(identifier)?.id)
    };

    match cmd {
        TaskCommands::Add {
            title,
            description,
            status,
            priority,
            due,
            owner,
        } => {
            let new = NewTask {
                title,
                description,
                status,
                priority,
                due_date: due,
                user_id: owner.as_deref().map(resolve_owner).transpose()?,
            };

            let outcome = service.create(new, actor)?;
            println!("Created task: {} ({})", outcome.task.title, outcome.task.id);
        }

        TaskCommands::List {
            status,
            priority,
            sort,
            asc,
        } => {
            let filter = TaskFilter {
                status,
                priority,
                sort,
                descending: !asc,
            };
            let tasks = service.list(&filter, actor)?;
            if tasks.is_empty() {
                println!("No tasks found.");
                return Ok(());
            }

            print!("{}", format_task_list(&tasks));
            println!("\nTotal: {} tasks", tasks.len());
        }

        TaskCommands::Show { task } => {
            let id = service.resolve(&task)?;
            let task = service.get(id, actor)?;
            let owner = match task.user_id {
                Some(user_id) => storage.users.get(user_id)?,
                None => None,
            };
            print!("{}", format_task_details(&task, owner.as_ref()));
        }

        TaskCommands::Update {
            task,
            title,
            description,
            clear_description,
            status,
            clear_status,
            priority,
            clear_priority,
            due,
            clear_due,
            owner,
            unassign,
        } => {
            let id = service.resolve(&task)?;
            let patch = TaskPatch {
                title,
                description: patch_field(description, clear_description),
                status: patch_field(status, clear_status),
                priority: patch_field(priority, clear_priority),
                due_date: patch_field(due, clear_due),
                user_id: patch_field(
                    owner.as_deref().map(resolve_owner).transpose()?,
                    unassign,
                ),
            };

            if patch.is_empty() {
                println!("Nothing to update.");
                return Ok(());
            }

            let outcome = service.update(id, patch, actor)?;
            match outcome.audit.len() {
                0 => println!("No changes to task: {}", outcome.task.title),
                n => println!(
                    "Updated task: {} ({} audit entr{})",
                    outcome.task.title,
                    n,
                    if n == 1 { "y" } else { "ies" }
                ),
            }
        }

        TaskCommands::Delete { task, force } => {
            let id = service.resolve(&task)?;
            let existing = service.get(id, actor)?;

            if !force {
                println!("About to delete task: {}", existing.title);
                println!("Its audit trail will be removed with it.");
                println!("Use --force to confirm deletion");
                return Ok(());
            }

            let outcome = service.delete(id, actor)?;
            println!("Deleted task: {}", outcome.task.title);
        }
    }

    Ok(())
}
