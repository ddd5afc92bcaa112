//! Display formatting for terminal output
//!
//! Formats tasks, users and audit trails for the terminal. Everything here
//! returns a `String`; printing is left to the CLI handlers.

pub mod audit;
pub mod task;
pub mod user;

pub use audit::{format_audit_details, format_audit_trail};
pub use task::{format_task_details, format_task_list};
pub use user::format_user_list;
