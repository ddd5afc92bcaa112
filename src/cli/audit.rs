//! Audit CLI commands
//!
//! Read-only access to a task's audit trail. Only an admin or the task's
//! owner may read it.

use clap::Subcommand;

use crate::display::{format_audit_details, format_audit_trail};
use crate::error::TrailResult;
use crate::services::{Actor, AuditService, TaskService};
use crate::storage::Storage;

/// Audit subcommands
#[derive(Subcommand)]
pub enum AuditCommands {
    /// List a task's audit trail, newest first
    List {
        /// Task ID
        task: String,
        /// Only status transitions
        #[arg(long)]
        status_only: bool,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Show one audit entry
    Show {
        /// Task ID
        task: String,
        /// Audit entry ID
        entry: String,
        /// Print JSON instead of a detail view
        #[arg(long)]
        json: bool,
    },
    /// Print the append-only journal, including deleted tasks (admins only)
    Journal,
}

/// Handle an audit command
pub fn handle_audit_command(storage: &Storage, actor: Actor<'_>, cmd: AuditCommands) -> TrailResult<()> {
    let service = AuditService::new(storage);
    let tasks = TaskService::new(storage);

    match cmd {
        AuditCommands::List {
            task,
            status_only,
            json,
        } => {
            let task_id = tasks.resolve(&task)?;
            let mut records = service.trail(task_id, actor)?;
            if status_only {
                records.retain(|r| r.entry.is_status_entry());
            }

            if json {
                println!("{}", serde_json::to_string_pretty(&records)?);
            } else {
                println!("{}", format_audit_trail(&records));
            }
        }

        AuditCommands::Show { task, entry, json } => {
            let task_id = tasks.resolve(&task)?;
            let entry_id = service.resolve_entry(&entry)?;
            let record = service.entry(task_id, entry_id, actor)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&record)?);
            } else {
                print!("{}", format_audit_details(&record));
            }
        }

        AuditCommands::Journal => {
            let entries = service.journal(actor)?;
            if entries.is_empty() {
                println!("The audit journal is empty.");
            }
            for entry in &entries {
                println!("{}", entry.format_human_readable());
            }
        }
    }

    Ok(())
}
