//! Read side of the audit trail

use serde::Serialize;

use super::entry::AuditEntry;
use crate::error::TrailResult;
use crate::models::{AuditEntryId, TaskId, User, UserId};

/// Display name used when an entry's acting user no longer resolves
pub const UNKNOWN_USER: &str = "Unknown User";

/// Display fields of the user who made a change
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActorSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<UserId>,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl ActorSummary {
    pub fn unknown() -> Self {
        Self {
            id: None,
            name: UNKNOWN_USER.to_string(),
            email: None,
        }
    }
}

impl From<&User> for ActorSummary {
    fn from(user: &User) -> Self {
        Self {
            id: Some(user.id),
            name: user.name.clone(),
            email: Some(user.email.clone()),
        }
    }
}

/// An entry joined with its actor for presentation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditRecord {
    #[serde(flatten)]
    pub entry: AuditEntry,

    /// Null only when the entry has no acting user at all
    pub user: Option<ActorSummary>,
}

/// Retrieval contract for the audit trail
///
/// Callers are responsible for checking that the actor may read the task.
pub trait AuditQuery {
    /// Every entry of a task, newest first
    fn list_for_task(&self, task_id: TaskId) -> TrailResult<Vec<AuditRecord>>;

    /// One entry, which must belong to `task_id`
    fn get_entry(&self, task_id: TaskId, entry_id: AuditEntryId) -> TrailResult<AuditRecord>;
}
