//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the service layer.

pub mod audit;
pub mod notify;
pub mod task;
pub mod user;

pub use audit::{handle_audit_command, AuditCommands};
pub use notify::{handle_notify_command, NotifyCommands};
pub use task::{handle_task_command, TaskCommands};
pub use user::{handle_user_command, UserCommands};
