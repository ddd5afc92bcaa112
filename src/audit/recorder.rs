//! Lifecycle hooks that turn task mutations into audit entries
//!
//! The task mutation pipeline calls [`AuditRecorder`] directly after each
//! successful write, passing the acting user explicitly. Each hook
//! classifies the mutation and appends the resulting entries through a
//! single creation primitive, [`AuditStore::append`].

use chrono::{DateTime, Utc};
use tracing::debug;

use super::classify::{
    changed_fields, classify_update, describe_created, describe_deleted, snapshot,
    AuditDescriptor,
};
use super::entry::AuditEntry;
use crate::error::TrailResult;
use crate::models::{AuditEntryId, Task, TaskId, UserId};

/// Append-only sink for audit entries
pub trait AuditStore {
    /// Persist one entry
    ///
    /// Fails with a storage error if the referenced task does not exist.
    /// Returns the entry as stored.
    fn append(&self, entry: AuditEntry) -> TrailResult<AuditEntry>;
}

/// Reactions to the task lifecycle
///
/// Each hook returns the entries it appended, in append order.
pub trait AuditRecorder {
    fn on_created(&self, task: &Task, actor: Option<UserId>) -> TrailResult<Vec<AuditEntry>>;

    /// `before` must be the task as of the start of this mutation
    fn on_updated(
        &self,
        before: &Task,
        after: &Task,
        actor: Option<UserId>,
    ) -> TrailResult<Vec<AuditEntry>>;

    fn on_deleted(&self, task: &Task, actor: Option<UserId>) -> TrailResult<Vec<AuditEntry>>;
}

/// Recorder that appends to any [`AuditStore`]
pub struct TaskAuditRecorder<'a, S: AuditStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: AuditStore + ?Sized> TaskAuditRecorder<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    fn record(
        &self,
        task_id: TaskId,
        actor: Option<UserId>,
        descriptors: Vec<AuditDescriptor>,
    ) -> TrailResult<Vec<AuditEntry>> {
        // Entries from one mutation share a timestamp
        let now = Utc::now();
        let mut written = Vec::with_capacity(descriptors.len());

        for descriptor in descriptors {
            let entry = build_entry(task_id, actor, descriptor, now);
            debug!(
                task = %task_id,
                action = %entry.action,
                field = entry.field_changed.as_deref().unwrap_or("-"),
                "appending audit entry"
            );
            written.push(self.store.append(entry)?);
        }

        Ok(written)
    }
}

impl<S: AuditStore + ?Sized> AuditRecorder for TaskAuditRecorder<'_, S> {
    fn on_created(&self, task: &Task, actor: Option<UserId>) -> TrailResult<Vec<AuditEntry>> {
        self.record(task.id, actor, vec![describe_created(task)])
    }

    fn on_updated(
        &self,
        before: &Task,
        after: &Task,
        actor: Option<UserId>,
    ) -> TrailResult<Vec<AuditEntry>> {
        let original = snapshot(before);
        let changes = changed_fields(&original, &snapshot(after));
        self.record(after.id, actor, classify_update(&original, &changes))
    }

    fn on_deleted(&self, task: &Task, actor: Option<UserId>) -> TrailResult<Vec<AuditEntry>> {
        self.record(task.id, actor, vec![describe_deleted(task)])
    }
}

fn build_entry(
    task_id: TaskId,
    actor: Option<UserId>,
    descriptor: AuditDescriptor,
    now: DateTime<Utc>,
) -> AuditEntry {
    AuditEntry {
        id: AuditEntryId::new(),
        task_id,
        user_id: actor,
        action: descriptor.action,
        field_changed: descriptor.field_changed,
        old_value: descriptor.old_value,
        new_value: descriptor.new_value,
        metadata: descriptor.metadata,
        created_at: now,
        updated_at: now,
        sequence: 0,
    }
}
