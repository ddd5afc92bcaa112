//! Service layer for TaskTrail
//!
//! The service layer provides business logic on top of the storage layer:
//! validation, authorization and the task mutation pipeline that drives the
//! audit recorder.

pub mod audit;
pub mod notify;
pub mod task;
pub mod user;

pub use audit::AuditService;
pub use notify::{DueNotice, DueTaskScanner, NotificationQueue, ScanReport};
pub use task::{NewTask, TaskFilter, TaskOutcome, TaskPatch, TaskService, TaskSort};
pub use user::UserService;

use std::fmt;

use crate::error::{TrailError, TrailResult};
use crate::models::{Task, User, UserId};

/// Who is performing an operation
///
/// `System` stands for an unauthenticated operator (the local CLI with no
/// `--as`, or a scheduled job). It has full access and is recorded as a
/// null acting user in the audit trail.
#[derive(Debug, Clone, Copy)]
pub enum Actor<'a> {
    System,
    User(&'a User),
}

impl<'a> Actor<'a> {
    pub fn from_user(user: Option<&'a User>) -> Self {
        user.map_or(Self::System, Self::User)
    }

    /// The id written to `user_id` on audit entries
    pub fn id(&self) -> Option<UserId> {
        match self {
            Self::System => None,
            Self::User(user) => Some(user.id),
        }
    }

    pub fn is_admin(&self) -> bool {
        match self {
            Self::System => true,
            Self::User(user) => user.is_admin(),
        }
    }

    /// Admins see everything; everyone else only their own tasks
    pub fn can_access(&self, task: &Task) -> bool {
        match self {
            Self::System => true,
            Self::User(user) => user.is_admin() || task.is_owned_by(user.id),
        }
    }

    pub(crate) fn authorize(&self, task: &Task) -> TrailResult<()> {
        if self.can_access(task) {
            Ok(())
        } else {
            Err(TrailError::Unauthorized(format!(
                "{} may not access task {}",
                self, task.id
            )))
        }
    }

    pub(crate) fn require_admin(&self, operation: &str) -> TrailResult<()> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(TrailError::Unauthorized(format!(
                "Only an admin may {}",
                operation
            )))
        }
    }
}

impl fmt::Display for Actor<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::System => write!(f, "system"),
            Self::User(user) => write!(f, "{}", user.email),
        }
    }
}
