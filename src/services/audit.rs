//! Audit retrieval service
//!
//! Serves a task's audit trail to callers allowed to read it: an admin or
//! the task's owner.

use super::Actor;
use crate::audit::{AuditEntry, AuditQuery, AuditRecord};
use crate::error::{TrailError, TrailResult};
use crate::models::{AuditEntryId, TaskId};
use crate::storage::Storage;

/// Service for reading audit trails
pub struct AuditService<'a> {
    storage: &'a Storage,
}

impl<'a> AuditService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Every entry of a task, newest first
    pub fn trail(&self, task_id: TaskId, actor: Actor<'_>) -> TrailResult<Vec<AuditRecord>> {
        self.authorize(task_id, actor)?;
        self.storage.list_for_task(task_id)
    }

    /// One entry of a task
    pub fn entry(
        &self,
        task_id: TaskId,
        entry_id: AuditEntryId,
        actor: Actor<'_>,
    ) -> TrailResult<AuditRecord> {
        self.authorize(task_id, actor)?;
        self.storage.get_entry(task_id, entry_id)
    }

    /// Every entry ever written, oldest first, including those of deleted
    /// tasks. Admins only.
    pub fn journal(&self, actor: Actor<'_>) -> TrailResult<Vec<AuditEntry>> {
        actor.require_admin("read the audit journal")?;
        self.storage.journal().read_all()
    }

    /// Resolve an entry identifier (full id, short id or id prefix)
    pub fn resolve_entry(&self, identifier: &str) -> TrailResult<AuditEntryId> {
        self.storage
            .audits
            .find(identifier)?
            .map(|e| e.id)
            .ok_or_else(|| TrailError::audit_entry_not_found(identifier))
    }

    fn authorize(&self, task_id: TaskId, actor: Actor<'_>) -> TrailResult<()> {
        let task = self
            .storage
            .tasks
            .get(task_id)?
            .ok_or_else(|| TrailError::task_not_found(task_id.to_string()))?;
        actor.authorize(&task)
    }
}
