//! Storage layer for TaskTrail
//!
//! Provides JSON file storage with atomic writes and automatic directory
//! creation. [`Storage`] coordinates the repositories and is the
//! persistence boundary for audit entries: it implements both
//! [`AuditStore`] and [`AuditQuery`].
//!
//! Mutations are staged in memory. `commit` writes every repository to disk
//! and then journals the audit entries appended since the last commit;
//! `rollback_audits` discards those entries instead. Once the repositories
//! are saved the unit of work is durable, so a journal failure after that
//! point is logged rather than returned.

pub mod audits;
pub mod file_io;
pub mod init;
pub mod tasks;
pub mod users;

pub use audits::AuditRepository;
pub use file_io::{read_json, write_json_atomic};
pub use init::initialize_storage;
pub use tasks::TaskRepository;
pub use users::UserRepository;

use std::sync::RwLock;

use tracing::{debug, warn};

use crate::audit::{ActorSummary, AuditEntry, AuditJournal, AuditQuery, AuditRecord, AuditStore};
use crate::config::TrailPaths;
use crate::error::{TrailError, TrailResult};
use crate::models::{AuditEntryId, Task, TaskId, User, UserId};

/// Main storage coordinator that provides access to all repositories
pub struct Storage {
    paths: TrailPaths,
    pub tasks: TaskRepository,
    pub users: UserRepository,
    pub audits: AuditRepository,
    journal: AuditJournal,
    /// Entries appended since the last commit or rollback
    pending: RwLock<Vec<AuditEntry>>,
    /// Appends still allowed before `append` starts failing
    #[cfg(test)]
    appends_allowed: RwLock<Option<usize>>,
}

impl Storage {
    /// Create a new Storage instance
    pub fn new(paths: TrailPaths) -> Result<Self, TrailError> {
        paths.ensure_directories()?;

        Ok(Self {
            tasks: TaskRepository::new(paths.tasks_file()),
            users: UserRepository::new(paths.users_file()),
            audits: AuditRepository::new(paths.audits_file()),
            journal: AuditJournal::new(paths.audit_journal()),
            pending: RwLock::new(Vec::new()),
            #[cfg(test)]
            appends_allowed: RwLock::new(None),
            paths,
        })
    }

    /// Get the paths configuration
    pub fn paths(&self) -> &TrailPaths {
        &self.paths
    }

    pub fn journal(&self) -> &AuditJournal {
        &self.journal
    }

    /// Load all data from disk
    pub fn load_all(&mut self) -> Result<(), TrailError> {
        self.tasks.load()?;
        self.users.load()?;
        self.audits.load()?;
        Ok(())
    }

    /// Save all data to disk
    pub fn save_all(&self) -> Result<(), TrailError> {
        self.tasks.save()?;
        self.users.save()?;
        self.audits.save()?;
        Ok(())
    }

    /// Persist the current unit of work and journal its audit entries
    ///
    /// On error the pending entries stay staged for `rollback_audits`.
    pub fn commit(&self) -> Result<(), TrailError> {
        let mut pending = self.pending.write().map_err(|e| {
            TrailError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;

        self.save_all()?;
        let committed = std::mem::take(&mut *pending);
        drop(pending);

        match self.journal.log_batch(&committed) {
            Ok(()) => debug!(entries = committed.len(), "committed audit entries"),
            Err(error) => warn!(
                entries = committed.len(),
                %error,
                "audit entries saved but not journaled"
            ),
        }
        Ok(())
    }

    /// Drop the audit entries appended since the last commit
    pub fn rollback_audits(&self) -> Result<(), TrailError> {
        let mut pending = self.pending.write().map_err(|e| {
            TrailError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;

        let ids: Vec<AuditEntryId> = pending.iter().map(|e| e.id).collect();
        self.audits.remove_all(&ids)?;
        pending.clear();
        Ok(())
    }

    /// Remove a task together with every audit entry that references it
    pub fn delete_task_cascade(&self, id: TaskId) -> Result<Option<Task>, TrailError> {
        let removed = self.tasks.delete(id)?;
        if removed.is_some() {
            let cascaded = self.audits.delete_for_task(id)?;
            debug!(task = %id, cascaded, "cascaded audit entries");
        }
        Ok(removed)
    }

    /// Remove a user, nulling their references on tasks and audit entries
    pub fn delete_user(&self, id: UserId) -> Result<Option<User>, TrailError> {
        let removed = self.users.delete(id)?;
        if removed.is_some() {
            let tasks = self.tasks.clear_owner(id)?;
            let entries = self.audits.clear_user(id)?;
            debug!(user = %id, tasks, entries, "detached deleted user");
        }
        Ok(removed)
    }

    /// Check if storage has been initialized
    pub fn is_initialized(&self) -> bool {
        self.paths.is_initialized()
    }

    /// Make `append` fail once `allowed` more entries have been accepted
    #[cfg(test)]
    pub(crate) fn fail_appends_after(&self, allowed: usize) {
        if let Ok(mut slot) = self.appends_allowed.write() {
            *slot = Some(allowed);
        }
    }

    #[cfg(test)]
    fn take_append_allowance(&self) -> TrailResult<()> {
        let mut slot = self.appends_allowed.write().map_err(|e| {
            TrailError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;
        match slot.as_mut() {
            Some(0) => Err(TrailError::Storage("Audit store unavailable".into())),
            Some(remaining) => {
                *remaining -= 1;
                Ok(())
            }
            None => Ok(()),
        }
    }

    fn join_actor(&self, entry: AuditEntry) -> TrailResult<AuditRecord> {
        let user = match entry.user_id {
            None => None,
            Some(id) => Some(
                self.users
                    .get(id)?
                    .map(|u| ActorSummary::from(&u))
                    .unwrap_or_else(ActorSummary::unknown),
            ),
        };
        Ok(AuditRecord { entry, user })
    }
}

impl AuditStore for Storage {
    fn append(&self, entry: AuditEntry) -> TrailResult<AuditEntry> {
        if !self.tasks.exists(entry.task_id)? {
            return Err(TrailError::Storage(format!(
                "Audit entry references missing task {}",
                entry.task_id
            )));
        }

        #[cfg(test)]
        self.take_append_allowance()?;

        let stored = self.audits.insert(entry)?;

        let mut pending = self.pending.write().map_err(|e| {
            TrailError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;
        pending.push(stored.clone());

        Ok(stored)
    }
}

impl AuditQuery for Storage {
    fn list_for_task(&self, task_id: TaskId) -> TrailResult<Vec<AuditRecord>> {
        if !self.tasks.exists(task_id)? {
            return Err(TrailError::task_not_found(task_id.to_string()));
        }

        self.audits
            .for_task(task_id)?
            .into_iter()
            .map(|entry| self.join_actor(entry))
            .collect()
    }

    fn get_entry(&self, task_id: TaskId, entry_id: AuditEntryId) -> TrailResult<AuditRecord> {
        match self.audits.get(entry_id)? {
            Some(entry) if entry.task_id == task_id => self.join_actor(entry),
            _ => Err(TrailError::audit_entry_not_found(entry_id.to_string())),
        }
    }
}
