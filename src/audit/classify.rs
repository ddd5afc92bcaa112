//! Change classification
//!
//! Turns a task mutation into the ordered set of audit records it should
//! produce. A status transition always gets its own record so it can be
//! queried by `field_changed = "status"`; the remaining field edits get one
//! more record, either naming the single field or summarizing several under
//! the `"multiple"` sentinel with full detail in metadata.
//!
//! Everything here is pure: no storage, no clock, no failure modes.

use std::collections::BTreeMap;

use tracing::trace;

use super::entry::{
    AuditAction, AuditMetadata, CreatedMeta, DeletedMeta, FieldChange, StatusMeta,
    MULTIPLE_FIELDS, STATUS_FIELD,
};
use super::format::{format_value, FieldValue};
use crate::models::{Task, TaskStatus};

/// Fields that are not domain-meaningful and never produce audit records
pub const BOOKKEEPING_FIELDS: &[&str] = &["created_at", "updated_at"];

/// Field name to value, as of one point in time
pub type Snapshot = BTreeMap<String, FieldValue>;

/// What to write for one audit record, before ids and timestamps are assigned
#[derive(Debug, Clone, PartialEq)]
pub struct AuditDescriptor {
    pub action: AuditAction,
    pub field_changed: Option<String>,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    pub metadata: AuditMetadata,
}

/// Capture every tracked field of a task
pub fn snapshot(task: &Task) -> Snapshot {
    let mut fields = Snapshot::new();
    fields.insert("title".into(), task.title.clone().into());
    fields.insert("description".into(), task.description.clone().into());
    fields.insert("status".into(), task.status.into());
    fields.insert("priority".into(), task.priority.into());
    fields.insert("due_date".into(), task.due_date.into());
    fields.insert("user_id".into(), task.user_id.into());
    fields.insert("created_at".into(), task.created_at.into());
    fields.insert("updated_at".into(), task.updated_at.into());
    fields
}

/// Fields whose value in `after` differs from `before`, with their new values
///
/// A field missing from `before` counts as previously null.
pub fn changed_fields(before: &Snapshot, after: &Snapshot) -> Snapshot {
    after
        .iter()
        .filter(|(field, new)| before.get(*field).unwrap_or(&FieldValue::Null) != *new)
        .map(|(field, new)| (field.clone(), new.clone()))
        .collect()
}

/// Classify an update into zero, one or two descriptors
///
/// `changes` maps each changed field to its new value and `original` is the
/// snapshot taken before the mutation. The status descriptor, when present,
/// always comes first.
pub fn classify_update(original: &Snapshot, changes: &Snapshot) -> Vec<AuditDescriptor> {
    let mut status_change: Option<(FieldValue, FieldValue)> = None;
    let mut others: BTreeMap<String, (FieldValue, FieldValue)> = BTreeMap::new();

    for (field, new) in changes {
        if BOOKKEEPING_FIELDS.contains(&field.as_str()) {
            continue;
        }

        let old = original.get(field).cloned().unwrap_or(FieldValue::Null);
        if field == STATUS_FIELD {
            status_change = Some((old, new.clone()));
        } else {
            others.insert(field.clone(), (old, new.clone()));
        }
    }

    let mut descriptors = Vec::with_capacity(2);

    if let Some((old, new)) = status_change {
        descriptors.push(describe_status_change(&old, &new));
    }

    match others.len() {
        0 => {}
        1 => {
            if let Some((field, (old, new))) = others.into_iter().next() {
                descriptors.push(describe_field_change(field, &old, &new));
            }
        }
        _ => descriptors.push(describe_multiple_changes(&others)),
    }

    trace!(records = descriptors.len(), "classified task update");
    descriptors
}

fn describe_status_change(old: &FieldValue, new: &FieldValue) -> AuditDescriptor {
    let completed = FieldValue::from(TaskStatus::Completed);
    let action = if *new == completed {
        AuditAction::Completed
    } else {
        AuditAction::StatusChanged
    };

    AuditDescriptor {
        action,
        field_changed: Some(STATUS_FIELD.to_string()),
        old_value: format_value(old),
        new_value: format_value(new),
        metadata: AuditMetadata::Status(StatusMeta {
            old_status: old.to_json(),
            new_status: new.to_json(),
        }),
    }
}

fn describe_field_change(field: String, old: &FieldValue, new: &FieldValue) -> AuditDescriptor {
    let mut metadata = BTreeMap::new();
    metadata.insert(
        field.clone(),
        FieldChange {
            old: old.to_json(),
            new: new.to_json(),
        },
    );

    AuditDescriptor {
        action: AuditAction::Updated,
        field_changed: Some(field),
        old_value: format_value(old),
        new_value: format_value(new),
        metadata: AuditMetadata::Field(metadata),
    }
}

fn describe_multiple_changes(
    changes: &BTreeMap<String, (FieldValue, FieldValue)>,
) -> AuditDescriptor {
    let metadata = changes
        .iter()
        .map(|(field, (old, new))| {
            (
                field.clone(),
                FieldChange {
                    old: old.to_json(),
                    new: new.to_json(),
                },
            )
        })
        .collect();

    AuditDescriptor {
        action: AuditAction::Updated,
        field_changed: Some(MULTIPLE_FIELDS.to_string()),
        old_value: None,
        new_value: None,
        metadata: AuditMetadata::Fields(metadata),
    }
}

/// The single record written when a task is created
pub fn describe_created(task: &Task) -> AuditDescriptor {
    AuditDescriptor {
        action: AuditAction::Created,
        field_changed: None,
        old_value: None,
        new_value: None,
        metadata: AuditMetadata::Created(CreatedMeta {
            title: task.title.clone(),
            status: task.status,
            priority: task.priority,
            due_date: task.due_date,
        }),
    }
}

/// The single record written when a task is deleted
pub fn describe_deleted(task: &Task) -> AuditDescriptor {
    AuditDescriptor {
        action: AuditAction::Deleted,
        field_changed: None,
        old_value: None,
        new_value: None,
        metadata: AuditMetadata::Deleted(DeletedMeta {
            title: task.title.clone(),
            status: task.status,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Priority;
    use chrono::{Duration, NaiveDate};
    use serde_json::json;

    fn classify(before: &Task, after: &Task) -> Vec<AuditDescriptor> {
        let original = snapshot(before);
        let changes = changed_fields(&original, &snapshot(after));
        classify_update(&original, &changes)
    }

    fn edited(task: &Task, edit: impl FnOnce(&mut Task)) -> Task {
        let mut after = task.clone();
        edit(&mut after);
        after.updated_at = task.updated_at + Duration::seconds(5);
        after
    }

    #[test]
    fn test_pending_to_completed() {
        let task = Task::new("Finish");
        let after = edited(&task, |t| t.status = Some(TaskStatus::Completed));

        let records = classify(&task, &after);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].action, AuditAction::Completed);
        assert_eq!(records[0].field_changed.as_deref(), Some("status"));
        assert_eq!(records[0].old_value.as_deref(), Some("pending"));
        assert_eq!(records[0].new_value.as_deref(), Some("completed"));
        assert_eq!(
            records[0].metadata,
            AuditMetadata::Status(StatusMeta {
                old_status: json!("pending"),
                new_status: json!("completed"),
            })
        );
    }

    #[test]
    fn test_non_completed_status_is_status_changed() {
        let mut task = Task::new("Reopen");
        task.status = Some(TaskStatus::Completed);

        for status in [TaskStatus::Pending, TaskStatus::InProgress] {
            let after = edited(&task, |t| t.status = Some(status));
            let records = classify(&task, &after);
            assert_eq!(records.len(), 1);
            assert_eq!(records[0].action, AuditAction::StatusChanged);
            assert_eq!(records[0].new_value.as_deref(), Some(status.as_str()));
        }
    }

    #[test]
    fn test_status_cleared_to_null() {
        let task = Task::new("Unset");
        let after = edited(&task, |t| t.status = None);

        let records = classify(&task, &after);
        assert_eq!(records[0].action, AuditAction::StatusChanged);
        assert_eq!(records[0].new_value, None);
    }

    #[test]
    fn test_single_field_update() {
        let task = Task::new("Old title");
        let after = edited(&task, |t| t.title = "New title".into());

        let records = classify(&task, &after);
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.action, AuditAction::Updated);
        assert_eq!(record.field_changed.as_deref(), Some("title"));
        assert_eq!(record.old_value.as_deref(), Some("Old title"));
        assert_eq!(record.new_value.as_deref(), Some("New title"));

        let changes = record.metadata.field_changes().unwrap();
        assert_eq!(changes["title"].old, json!("Old title"));
        assert_eq!(changes["title"].new, json!("New title"));
    }

    #[test]
    fn test_due_date_formatting_in_single_update() {
        let task = Task::new("Dated");
        let after = edited(&task, |t| t.due_date = NaiveDate::from_ymd_opt(2026, 5, 4));

        let records = classify(&task, &after);
        assert_eq!(records[0].field_changed.as_deref(), Some("due_date"));
        assert_eq!(records[0].old_value, None);
        assert_eq!(records[0].new_value.as_deref(), Some("2026-05-04 00:00:00"));
    }

    #[test]
    fn test_multiple_field_update() {
        let task = Task::new("Draft");
        let after = edited(&task, |t| {
            t.title = "Final".into();
            t.priority = Some(Priority::High);
        });

        let records = classify(&task, &after);
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.action, AuditAction::Updated);
        assert_eq!(record.field_changed.as_deref(), Some(MULTIPLE_FIELDS));
        assert_eq!(record.old_value, None);
        assert_eq!(record.new_value, None);

        let AuditMetadata::Fields(changes) = &record.metadata else {
            panic!("expected multi-field metadata");
        };
        assert_eq!(changes.len(), 2);
        assert_eq!(changes["title"], FieldChange { old: json!("Draft"), new: json!("Final") });
        assert_eq!(
            changes["priority"],
            FieldChange { old: json!("medium"), new: json!("high") }
        );
    }

    #[test]
    fn test_status_and_other_field_give_two_records() {
        let task = Task::new("Both");
        let after = edited(&task, |t| {
            t.status = Some(TaskStatus::InProgress);
            t.description = Some("started".into());
        });

        let records = classify(&task, &after);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].field_changed.as_deref(), Some("status"));
        assert_eq!(records[0].action, AuditAction::StatusChanged);
        assert_eq!(records[1].field_changed.as_deref(), Some("description"));
    }

    #[test]
    fn test_status_and_several_fields() {
        let task = Task::new("Batch");
        let after = edited(&task, |t| {
            t.status = Some(TaskStatus::Completed);
            t.title = "Batch done".into();
            t.priority = Some(Priority::Low);
        });

        let records = classify(&task, &after);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].action, AuditAction::Completed);
        assert_eq!(records[1].field_changed.as_deref(), Some(MULTIPLE_FIELDS));
        let changes = records[1].metadata.field_changes().unwrap();
        assert!(!changes.contains_key("status"));
    }

    #[test]
    fn test_bookkeeping_only_produces_nothing() {
        let task = Task::new("Untouched");
        let after = edited(&task, |_| {});

        let original = snapshot(&task);
        let changes = changed_fields(&original, &snapshot(&after));
        assert_eq!(changes.len(), 1);
        assert!(changes.contains_key("updated_at"));
        assert!(classify_update(&original, &changes).is_empty());
    }

    #[test]
    fn test_empty_changes_produce_nothing() {
        let original = snapshot(&Task::new("Same"));
        assert!(classify_update(&original, &Snapshot::new()).is_empty());
    }

    #[test]
    fn test_missing_original_value_treated_as_null() {
        let mut changes = Snapshot::new();
        changes.insert("estimate".into(), FieldValue::Integer(3));

        let records = classify_update(&Snapshot::new(), &changes);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].old_value, None);
        assert_eq!(records[0].new_value.as_deref(), Some("3"));
        let changes = records[0].metadata.field_changes().unwrap();
        assert_eq!(changes["estimate"].old, serde_json::Value::Null);
    }

    #[test]
    fn test_created_descriptor() {
        let mut task = Task::new("Launch");
        task.due_date = NaiveDate::from_ymd_opt(2026, 6, 30);

        let record = describe_created(&task);
        assert_eq!(record.action, AuditAction::Created);
        assert_eq!(record.field_changed, None);
        assert_eq!(record.old_value, None);
        assert_eq!(record.new_value, None);
        assert_eq!(
            serde_json::to_value(&record.metadata).unwrap(),
            json!({
                "title": "Launch",
                "status": "pending",
                "priority": "medium",
                "due_date": "2026-06-30"
            })
        );
    }

    #[test]
    fn test_deleted_descriptor() {
        let mut task = Task::new("Obsolete");
        task.status = Some(TaskStatus::InProgress);

        let record = describe_deleted(&task);
        assert_eq!(record.action, AuditAction::Deleted);
        assert_eq!(record.field_changed, None);
        assert_eq!(
            serde_json::to_value(&record.metadata).unwrap(),
            json!({"title": "Obsolete", "status": "in-progress"})
        );
    }
}
