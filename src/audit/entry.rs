//! Audit entry data structures
//!
//! An [`AuditEntry`] is one immutable record of one logical change to a task.
//! Its `metadata` is typed per action but serializes to the same loose JSON
//! shapes the `task_audits` schema stores.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::{AuditEntryId, Priority, TaskId, TaskStatus, UserId};

/// Field name that gets its own status-focused entry
pub const STATUS_FIELD: &str = "status";

/// `field_changed` sentinel for a summary of several field edits
pub const MULTIPLE_FIELDS: &str = "multiple";

/// Kind of change an entry records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Created,
    Updated,
    StatusChanged,
    Completed,
    Deleted,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::StatusChanged => "status_changed",
            Self::Completed => "completed",
            Self::Deleted => "deleted",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw before/after pair of one field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldChange {
    pub old: Value,
    pub new: Value,
}

/// Snapshot of a newly created task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatedMeta {
    pub title: String,
    pub status: Option<TaskStatus>,
    pub priority: Option<Priority>,
    pub due_date: Option<NaiveDate>,
}

/// Raw status values around a status transition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusMeta {
    pub old_status: Value,
    pub new_status: Value,
}

/// Snapshot of a task at the moment it was deleted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeletedMeta {
    pub title: String,
    pub status: Option<TaskStatus>,
}

/// Auxiliary data attached to an entry, one shape per kind of entry
///
/// Serialized untagged, so `Field` and `Fields` both appear as a plain
/// `{field: {old, new}}` map on disk. Reading back uses the entry's action
/// and `field_changed` to pick the variant.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AuditMetadata {
    Created(CreatedMeta),
    Status(StatusMeta),
    /// Exactly one non-status field
    Field(BTreeMap<String, FieldChange>),
    /// Two or more non-status fields
    Fields(BTreeMap<String, FieldChange>),
    Deleted(DeletedMeta),
}

impl AuditMetadata {
    /// Rebuild typed metadata from its stored JSON form
    pub fn from_stored(
        action: AuditAction,
        field_changed: Option<&str>,
        value: Value,
    ) -> Result<Self, serde_json::Error> {
        Ok(match (action, field_changed) {
            (AuditAction::Created, _) => Self::Created(serde_json::from_value(value)?),
            (AuditAction::Deleted, _) => Self::Deleted(serde_json::from_value(value)?),
            (AuditAction::StatusChanged | AuditAction::Completed, _) => {
                Self::Status(serde_json::from_value(value)?)
            }
            (AuditAction::Updated, Some(MULTIPLE_FIELDS)) => {
                Self::Fields(serde_json::from_value(value)?)
            }
            (AuditAction::Updated, _) => Self::Field(serde_json::from_value(value)?),
        })
    }

    /// Per-field changes, for update entries
    pub fn field_changes(&self) -> Option<&BTreeMap<String, FieldChange>> {
        match self {
            Self::Field(changes) | Self::Fields(changes) => Some(changes),
            _ => None,
        }
    }
}

/// One immutable row of a task's audit trail
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "StoredAuditEntry")]
pub struct AuditEntry {
    pub id: AuditEntryId,

    /// Owning task; entries are removed when the task is
    pub task_id: TaskId,

    /// Acting user, null for system-driven changes
    pub user_id: Option<UserId>,

    pub action: AuditAction,

    /// A field name, the `"multiple"` sentinel, or null for create/delete
    pub field_changed: Option<String>,

    pub old_value: Option<String>,

    pub new_value: Option<String>,

    pub metadata: AuditMetadata,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,

    /// Insertion order within the store, breaks timestamp ties
    #[serde(default)]
    pub sequence: u64,
}

/// On-disk form of an entry, with metadata still untyped
#[derive(Deserialize)]
struct StoredAuditEntry {
    id: AuditEntryId,
    task_id: TaskId,
    #[serde(default)]
    user_id: Option<UserId>,
    action: AuditAction,
    #[serde(default)]
    field_changed: Option<String>,
    #[serde(default)]
    old_value: Option<String>,
    #[serde(default)]
    new_value: Option<String>,
    metadata: Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[serde(default)]
    sequence: u64,
}

impl TryFrom<StoredAuditEntry> for AuditEntry {
    type Error = serde_json::Error;

    fn try_from(stored: StoredAuditEntry) -> Result<Self, Self::Error> {
        let metadata = AuditMetadata::from_stored(
            stored.action,
            stored.field_changed.as_deref(),
            stored.metadata,
        )?;

        Ok(Self {
            id: stored.id,
            task_id: stored.task_id,
            user_id: stored.user_id,
            action: stored.action,
            field_changed: stored.field_changed,
            old_value: stored.old_value,
            new_value: stored.new_value,
            metadata,
            created_at: stored.created_at,
            updated_at: stored.updated_at,
            sequence: stored.sequence,
        })
    }
}

impl AuditEntry {
    /// Whether this entry concerns the task's status
    pub fn is_status_entry(&self) -> bool {
        self.field_changed.as_deref() == Some(STATUS_FIELD)
    }

    /// Format the entry as a single line
    pub fn format_human_readable(&self) -> String {
        let mut output = format!(
            "[{}] {} {}",
            self.created_at.format("%Y-%m-%d %H:%M:%S UTC"),
            self.action,
            self.task_id
        );

        if let Some(field) = &self.field_changed {
            output.push_str(&format!(" {}", field));
        }

        if self.old_value.is_some() || self.new_value.is_some() {
            output.push_str(&format!(
                ": {} -> {}",
                self.old_value.as_deref().unwrap_or("(none)"),
                self.new_value.as_deref().unwrap_or("(none)")
            ));
        }

        output
    }
}
