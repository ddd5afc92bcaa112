//! Notification CLI commands
//!
//! `check-due` is meant to be run from cron or a systemd timer.

use chrono::{Local, NaiveDate};
use clap::Subcommand;

use crate::config::Settings;
use crate::error::TrailResult;
use crate::services::{DueTaskScanner, NotificationQueue};
use crate::storage::Storage;

/// Notification subcommands
#[derive(Subcommand)]
pub enum NotifyCommands {
    /// Queue reminders for tasks due soon or overdue
    CheckDue {
        /// Scan as of this date instead of today (YYYY-MM-DD)
        #[arg(long)]
        today: Option<NaiveDate>,
        /// Report matches without queueing anything
        #[arg(long)]
        dry_run: bool,
    },
}

/// Handle a notify command
pub fn handle_notify_command(storage: &Storage, settings: &Settings, cmd: NotifyCommands) -> TrailResult<()> {
    match cmd {
        NotifyCommands::CheckDue { today, dry_run } => {
            let today = today.unwrap_or_else(|| Local::now().date_naive());
            let report = DueTaskScanner::new(storage, &settings.notifications).scan(today)?;
            let (start, end) = report.window;

            if report.notices.is_empty() {
                println!("No tasks due soon.");
                println!("Checked for tasks due between {} and {}", start, end);
                if let Some(since) = report.overdue_since {
                    println!("Also checked for overdue tasks since {}", since);
                }
            } else {
                println!("Found {} task(s) due soon or overdue.", report.notices.len());
                println!("Checking tasks due between {} and {}", start, end);
                if let Some(since) = report.overdue_since {
                    println!("Also checking overdue tasks since {}", since);
                }

                for notice in &report.notices {
                    println!(
                        "{} notification for task: {} (Due: {} - {}) -> {}",
                        if dry_run { "Would queue" } else { "Queued" },
                        notice.title,
                        notice.due_date,
                        notice.status_text(),
                        notice.recipient
                    );
                }

                if !dry_run {
                    let queue = NotificationQueue::new(storage.paths().outbox_file());
                    queue.enqueue(&report.notices)?;
                    println!("All notifications have been queued.");
                }
            }

            if report.skipped > 0 {
                println!(
                    "Skipped {} task(s) with no recipient (set ADMIN_EMAIL to cover unassigned tasks)",
                    report.skipped
                );
            }
        }
    }

    Ok(())
}
