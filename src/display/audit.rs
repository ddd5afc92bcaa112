//! Audit trail display formatting

use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::audit::{AuditRecord, FieldChange};

use super::task::truncate;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Tabled)]
struct TrailRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "When")]
    when: String,
    #[tabled(rename = "Action")]
    action: String,
    #[tabled(rename = "Field")]
    field: String,
    #[tabled(rename = "Change")]
    change: String,
    #[tabled(rename = "By")]
    by: String,
}

impl From<&AuditRecord> for TrailRow {
    fn from(record: &AuditRecord) -> Self {
        let entry = &record.entry;
        let change = if entry.old_value.is_some() || entry.new_value.is_some() {
            format!(
                "{} -> {}",
                truncate(entry.old_value.as_deref().unwrap_or("(none)"), 24),
                truncate(entry.new_value.as_deref().unwrap_or("(none)"), 24)
            )
        } else {
            String::new()
        };

        Self {
            id: entry.id.to_string(),
            when: entry.created_at.format(TIMESTAMP_FORMAT).to_string(),
            action: entry.action.to_string(),
            field: entry.field_changed.clone().unwrap_or_default(),
            change,
            by: actor_name(record),
        }
    }
}

fn actor_name(record: &AuditRecord) -> String {
    record
        .user
        .as_ref()
        .map(|u| u.name.clone())
        .unwrap_or_else(|| "system".to_string())
}

/// Format a task's trail, newest first, as a table
pub fn format_audit_trail(records: &[AuditRecord]) -> String {
    if records.is_empty() {
        return "No audit entries found.".to_string();
    }

    let rows: Vec<TrailRow> = records.iter().map(TrailRow::from).collect();
    Table::new(rows).with(Style::psql()).to_string()
}

/// Format one entry with its full metadata
pub fn format_audit_details(record: &AuditRecord) -> String {
    let entry = &record.entry;
    let mut output = String::new();

    output.push_str(&format!("Audit entry: {}\n", entry.id.as_uuid()));
    output.push_str(&format!("  Task:      {}\n", entry.task_id.as_uuid()));
    output.push_str(&format!("  Action:    {}\n", entry.action));
    if let Some(field) = &entry.field_changed {
        output.push_str(&format!("  Field:     {}\n", field));
    }
    if entry.old_value.is_some() || entry.new_value.is_some() {
        output.push_str(&format!(
            "  Old value: {}\n",
            entry.old_value.as_deref().unwrap_or("(none)")
        ));
        output.push_str(&format!(
            "  New value: {}\n",
            entry.new_value.as_deref().unwrap_or("(none)")
        ));
    }

    match &record.user {
        Some(user) => match &user.email {
            Some(email) => output.push_str(&format!("  By:        {} <{}>\n", user.name, email)),
            None => output.push_str(&format!("  By:        {}\n", user.name)),
        },
        None => output.push_str("  By:        system\n"),
    }
    output.push_str(&format!(
        "  At:        {}\n",
        entry.created_at.format(TIMESTAMP_FORMAT)
    ));

    match entry.metadata.field_changes() {
        Some(changes) => {
            output.push_str("\n  Changes:\n");
            for (field, change) in changes {
                output.push_str(&format!("    {}: {}\n", field, format_change(change)));
            }
        }
        None => {
            let metadata = serde_json::to_string(&entry.metadata).unwrap_or_default();
            output.push_str(&format!("\n  Metadata:  {}\n", metadata));
        }
    }

    output
}

fn format_change(change: &FieldChange) -> String {
    format!("{} -> {}", change.old, change.new)
}
