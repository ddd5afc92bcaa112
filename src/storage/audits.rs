//! Audit entry repository for JSON storage
//!
//! Holds the queryable copy of the audit trail in audits.json. Entries are
//! never edited here; they only arrive through `insert` and leave through
//! the cascade and set-null operations the coordinator drives.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use crate::audit::AuditEntry;
use crate::error::TrailError;
use crate::models::{AuditEntryId, TaskId, UserId};

use super::file_io::{read_json, write_json_atomic};

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct AuditData {
    entries: Vec<AuditEntry>,
}

/// Repository for audit entry persistence
pub struct AuditRepository {
    path: PathBuf,
    data: RwLock<HashMap<AuditEntryId, AuditEntry>>,
    next_sequence: AtomicU64,
}

impl AuditRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
            next_sequence: AtomicU64::new(1),
        }
    }

    /// Load entries from disk
    pub fn load(&self) -> Result<(), TrailError> {
        let file_data: AuditData = read_json(&self.path)?;

        let mut data = self.data.write().map_err(|e| {
            TrailError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;

        data.clear();
        let mut highest = 0;
        for entry in file_data.entries {
            highest = highest.max(entry.sequence);
            data.insert(entry.id, entry);
        }
        self.next_sequence.store(highest + 1, Ordering::SeqCst);

        Ok(())
    }

    /// Save entries to disk in insertion order
    pub fn save(&self) -> Result<(), TrailError> {
        let data = self.data.read().map_err(|e| {
            TrailError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;

        let mut entries: Vec<_> = data.values().cloned().collect();
        entries.sort_by_key(|e| e.sequence);

        write_json_atomic(&self.path, &AuditData { entries })
    }

    /// Store a new entry, stamping its sequence number
    pub fn insert(&self, mut entry: AuditEntry) -> Result<AuditEntry, TrailError> {
        let mut data = self.data.write().map_err(|e| {
            TrailError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;

        if data.contains_key(&entry.id) {
            return Err(TrailError::Storage(format!(
                "Audit entry {} already recorded",
                entry.id
            )));
        }

        entry.sequence = self.next_sequence.fetch_add(1, Ordering::SeqCst);
        data.insert(entry.id, entry.clone());
        Ok(entry)
    }

    pub fn get(&self, id: AuditEntryId) -> Result<Option<AuditEntry>, TrailError> {
        let data = self.data.read().map_err(|e| {
            TrailError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(data.get(&id).cloned())
    }

    /// Find an entry by full id, prefixed short id, or id prefix
    pub fn find(&self, identifier: &str) -> Result<Option<AuditEntry>, TrailError> {
        if let Ok(id) = identifier.parse::<AuditEntryId>() {
            if let Some(entry) = self.get(id)? {
                return Ok(Some(entry));
            }
        }

        let data = self.data.read().map_err(|e| {
            TrailError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;

        let mut matches = data.values().filter(|e| e.id.matches(identifier));
        match (matches.next(), matches.next()) {
            (Some(entry), None) => Ok(Some(entry.clone())),
            (Some(_), Some(_)) => Err(TrailError::Validation(format!(
                "Ambiguous audit entry id '{}'",
                identifier
            ))),
            _ => Ok(None),
        }
    }

    /// Entries of one task, newest first
    ///
    /// Creation time orders the trail; insertion order breaks ties between
    /// entries written in the same instant.
    pub fn for_task(&self, task_id: TaskId) -> Result<Vec<AuditEntry>, TrailError> {
        let data = self.data.read().map_err(|e| {
            TrailError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;

        let mut entries: Vec<_> = data
            .values()
            .filter(|e| e.task_id == task_id)
            .cloned()
            .collect();
        entries.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then(b.sequence.cmp(&a.sequence))
        });
        Ok(entries)
    }

    /// Remove specific entries (used to undo an aborted unit of work)
    pub fn remove_all(&self, ids: &[AuditEntryId]) -> Result<(), TrailError> {
        let mut data = self.data.write().map_err(|e| {
            TrailError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;

        for id in ids {
            data.remove(id);
        }
        Ok(())
    }

    /// Put back entries removed by an aborted cascade, sequence numbers intact
    pub fn restore(&self, entries: Vec<AuditEntry>) -> Result<(), TrailError> {
        let mut data = self.data.write().map_err(|e| {
            TrailError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;

        for entry in entries {
            data.insert(entry.id, entry);
        }
        Ok(())
    }

    /// Cascade: drop every entry of a task, returning how many were removed
    pub fn delete_for_task(&self, task_id: TaskId) -> Result<usize, TrailError> {
        let mut data = self.data.write().map_err(|e| {
            TrailError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;

        let before = data.len();
        data.retain(|_, e| e.task_id != task_id);
        Ok(before - data.len())
    }

    /// Set-null: detach a deleted user from the entries they made
    pub fn clear_user(&self, user_id: UserId) -> Result<usize, TrailError> {
        let mut data = self.data.write().map_err(|e| {
            TrailError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;

        let mut cleared = 0;
        for entry in data.values_mut().filter(|e| e.user_id == Some(user_id)) {
            entry.user_id = None;
            cleared += 1;
        }
        Ok(cleared)
    }

    pub fn count(&self) -> Result<usize, TrailError> {
        let data = self.data.read().map_err(|e| {
            TrailError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(data.len())
    }
}
