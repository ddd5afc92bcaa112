//! Core data models for TaskTrail
//!
//! Tasks are the mutable work items being tracked; users own tasks and act
//! on them. Audit entries live in the `audit` module.

pub mod ids;
pub mod task;
pub mod user;

pub use ids::{AuditEntryId, TaskId, UserId};
pub use task::{Priority, Task, TaskStatus, TaskValidationError};
pub use user::{Role, User};
