//! Append-only audit journal
//!
//! Every entry appended to the store is also written here as one JSON line
//! and flushed immediately. Cascade deletes never touch the journal, so it
//! keeps the history of deleted tasks, including their "deleted" entries.
//! It is write-only history: nothing is ever rebuilt from it.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use crate::error::{TrailError, TrailResult};

use super::entry::AuditEntry;

/// Writes audit entries to a line-delimited JSON (JSONL) file
pub struct AuditJournal {
    path: PathBuf,
}

impl AuditJournal {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Append entries and flush once at the end
    pub fn log_batch(&self, entries: &[AuditEntry]) -> TrailResult<()> {
        if entries.is_empty() {
            return Ok(());
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| TrailError::Io(format!("Failed to open audit journal: {}", e)))?;

        for entry in entries {
            let json = serde_json::to_string(entry).map_err(|e| {
                TrailError::Json(format!("Failed to serialize audit entry: {}", e))
            })?;

            writeln!(file, "{}", json)
                .map_err(|e| TrailError::Io(format!("Failed to write audit entry: {}", e)))?;
        }

        file.flush()
            .map_err(|e| TrailError::Io(format!("Failed to flush audit journal: {}", e)))?;

        Ok(())
    }

    /// Read every journaled entry, oldest first
    pub fn read_all(&self) -> TrailResult<Vec<AuditEntry>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.path)
            .map_err(|e| TrailError::Io(format!("Failed to open audit journal: {}", e)))?;

        let mut entries = Vec::new();
        for (line_num, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(|e| {
                TrailError::Io(format!(
                    "Failed to read audit journal line {}: {}",
                    line_num + 1,
                    e
                ))
            })?;

            if line.trim().is_empty() {
                continue;
            }

            let entry: AuditEntry = serde_json::from_str(&line).map_err(|e| {
                TrailError::Json(format!(
                    "Failed to parse audit entry at line {}: {}",
                    line_num + 1,
                    e
                ))
            })?;
            entries.push(entry);
        }

        Ok(entries)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::classify::describe_deleted;
    use crate::audit::entry::AuditAction;
    use crate::models::{AuditEntryId, Task};
    use chrono::Utc;
    use tempfile::TempDir;

    fn deleted_entry(title: &str) -> AuditEntry {
        let task = Task::new(title);
        let descriptor = describe_deleted(&task);
        let now = Utc::now();
        AuditEntry {
            id: AuditEntryId::new(),
            task_id: task.id,
            user_id: None,
            action: descriptor.action,
            field_changed: descriptor.field_changed,
            old_value: descriptor.old_value,
            new_value: descriptor.new_value,
            metadata: descriptor.metadata,
            created_at: now,
            updated_at: now,
            sequence: 1,
        }
    }

    #[test]
    fn test_empty_journal() {
        let temp_dir = TempDir::new().unwrap();
        let journal = AuditJournal::new(temp_dir.path().join("audit.log"));
        assert!(journal.read_all().unwrap().is_empty());
        journal.log_batch(&[]).unwrap();
        assert!(!journal.path().exists());
    }

    #[test]
    fn test_batches_accumulate() {
        let temp_dir = TempDir::new().unwrap();
        let journal = AuditJournal::new(temp_dir.path().join("audit.log"));

        journal.log_batch(&[deleted_entry("one")]).unwrap();
        journal
            .log_batch(&[deleted_entry("two"), deleted_entry("three")])
            .unwrap();

        // Reopen, as after a restart
        let reopened = AuditJournal::new(temp_dir.path().join("audit.log"));
        let entries = reopened.read_all().unwrap();
        assert_eq!(entries.len(), 3);
        assert!(entries.iter().all(|e| e.action == AuditAction::Deleted));
    }

    #[test]
    fn test_corrupt_line_reports_position() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("audit.log");
        std::fs::write(&path, "\nnot json\n").unwrap();

        let err = AuditJournal::new(path).read_all().unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }
}
