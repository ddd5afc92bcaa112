//! Task service
//!
//! The task mutation pipeline. Every create, update and delete runs as one
//! unit of work: the task change is staged, the audit recorder appends its
//! entries, and only then is everything committed to disk. If the audit
//! write fails the staged task change is undone and nothing is persisted.

use std::cmp::Ordering;
use std::str::FromStr;

use chrono::NaiveDate;
use tracing::{info, warn};

use super::Actor;
use crate::audit::{AuditEntry, AuditRecorder, TaskAuditRecorder};
use crate::error::{TrailError, TrailResult};
use crate::models::{Priority, Task, TaskId, TaskStatus, UserId};
use crate::storage::Storage;

/// Input for creating a task
#[derive(Debug, Clone, Default)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    /// Defaults to pending
    pub status: Option<TaskStatus>,
    /// Defaults to medium
    pub priority: Option<Priority>,
    pub due_date: Option<NaiveDate>,
    /// Owner; only an admin may set it. Defaults to the acting user.
    pub user_id: Option<UserId>,
}

impl NewTask {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }
}

/// A partial update. `None` leaves a field alone; `Some(None)` clears it.
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub status: Option<Option<TaskStatus>>,
    pub priority: Option<Option<Priority>>,
    pub due_date: Option<Option<NaiveDate>>,
    pub user_id: Option<Option<UserId>>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.status.is_none()
            && self.priority.is_none()
            && self.due_date.is_none()
            && self.user_id.is_none()
    }

    fn apply(self, task: &mut Task) {
        if let Some(title) = self.title {
            task.title = title.trim().to_string();
        }
        if let Some(description) = self.description {
            task.description = description;
        }
        if let Some(status) = self.status {
            task.status = status;
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(due_date) = self.due_date {
            task.due_date = due_date;
        }
        if let Some(user_id) = self.user_id {
            task.user_id = user_id;
        }
    }
}

/// Sort key for task listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskSort {
    #[default]
    CreatedAt,
    DueDate,
    Priority,
    Title,
}

impl FromStr for TaskSort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "created_at" | "created" => Ok(Self::CreatedAt),
            "due_date" | "due" => Ok(Self::DueDate),
            "priority" => Ok(Self::Priority),
            "title" => Ok(Self::Title),
            other => Err(format!(
                "Invalid sort '{}' (expected created_at, due_date, priority or title)",
                other
            )),
        }
    }
}

/// Listing filter; the default lists everything newest first
#[derive(Debug, Clone)]
pub struct TaskFilter {
    pub status: Option<TaskStatus>,
    pub priority: Option<Priority>,
    pub sort: TaskSort,
    pub descending: bool,
}

impl Default for TaskFilter {
    fn default() -> Self {
        Self {
            status: None,
            priority: None,
            sort: TaskSort::default(),
            descending: true,
        }
    }
}

impl TaskFilter {
    fn matches(&self, task: &Task) -> bool {
        self.status.map_or(true, |s| task.status == Some(s))
            && self.priority.map_or(true, |p| task.priority == Some(p))
    }

    fn compare(&self, a: &Task, b: &Task) -> Ordering {
        let ordering = match self.sort {
            TaskSort::CreatedAt => a.created_at.cmp(&b.created_at),
            TaskSort::DueDate => a.due_date.cmp(&b.due_date),
            TaskSort::Priority => a.priority.cmp(&b.priority),
            TaskSort::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
        };
        let ordering = ordering.then_with(|| a.id.cmp(&b.id));

        if self.descending {
            ordering.reverse()
        } else {
            ordering
        }
    }
}

/// A task as left by a mutation, with the audit entries it produced
#[derive(Debug, Clone)]
pub struct TaskOutcome {
    pub task: Task,
    pub audit: Vec<AuditEntry>,
}

/// Service for task management
pub struct TaskService<'a> {
    storage: &'a Storage,
}

impl<'a> TaskService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Resolve a task identifier (full id, short id or id prefix)
    pub fn resolve(&self, identifier: &str) -> TrailResult<TaskId> {
        self.storage
            .tasks
            .find(identifier)?
            .map(|t| t.id)
            .ok_or_else(|| TrailError::task_not_found(identifier))
    }

    /// Create a task and record its "created" entry
    pub fn create(&self, new: NewTask, actor: Actor<'_>) -> TrailResult<TaskOutcome> {
        let owner = match new.user_id {
            Some(user_id) => {
                actor.require_admin("assign tasks to a user")?;
                self.require_user(user_id)?;
                Some(user_id)
            }
            None => actor.id(),
        };

        let mut task = Task::new(new.title.trim());
        task.description = new.description;
        task.status = Some(new.status.unwrap_or_default());
        task.priority = Some(new.priority.unwrap_or_default());
        task.due_date = new.due_date;
        task.user_id = owner;

        task.validate()
            .map_err(|e| TrailError::Validation(e.to_string()))?;

        self.storage.tasks.upsert(task.clone())?;

        let audit = match self.record_and_commit(|r| r.on_created(&task, actor.id())) {
            Ok(entries) => entries,
            Err(e) => {
                self.storage.tasks.delete(task.id)?;
                return Err(self.abort(task.id, "create", e));
            }
        };

        info!(task = %task.id, actor = %actor, "created task");

        Ok(TaskOutcome { task, audit })
    }

    /// Apply a patch and record what changed
    pub fn update(&self, id: TaskId, patch: TaskPatch, actor: Actor<'_>) -> TrailResult<TaskOutcome> {
        // The snapshot compared against is the stored state as of now
        let before = self
            .storage
            .tasks
            .get(id)?
            .ok_or_else(|| TrailError::task_not_found(id.to_string()))?;
        actor.authorize(&before)?;

        if let Some(user_id) = patch.user_id {
            actor.require_admin("reassign tasks")?;
            if let Some(user_id) = user_id {
                self.require_user(user_id)?;
            }
        }

        let mut after = before.clone();
        patch.apply(&mut after);
        after
            .validate()
            .map_err(|e| TrailError::Validation(e.to_string()))?;
        after.touch();

        self.storage.tasks.upsert(after.clone())?;

        let audit = match self.record_and_commit(|r| r.on_updated(&before, &after, actor.id())) {
            Ok(entries) => entries,
            Err(e) => {
                self.storage.tasks.upsert(before)?;
                return Err(self.abort(id, "update", e));
            }
        };

        info!(task = %id, actor = %actor, entries = audit.len(), "updated task");

        Ok(TaskOutcome { task: after, audit })
    }

    /// Record the "deleted" entry, then remove the task and its trail
    pub fn delete(&self, id: TaskId, actor: Actor<'_>) -> TrailResult<TaskOutcome> {
        let task = self
            .storage
            .tasks
            .get(id)?
            .ok_or_else(|| TrailError::task_not_found(id.to_string()))?;
        actor.authorize(&task)?;

        let trail = self.storage.audits.for_task(id)?;

        // Appended while the task still exists; it survives in the journal
        let deleted = self.record_and_commit(|r| {
            let entries = r.on_deleted(&task, actor.id())?;
            self.storage.delete_task_cascade(id)?;
            Ok(entries)
        });
        let audit = match deleted {
            Ok(entries) => entries,
            Err(e) => {
                self.storage.tasks.upsert(task)?;
                self.storage.audits.restore(trail)?;
                return Err(self.abort(id, "delete", e));
            }
        };

        info!(task = %id, actor = %actor, "deleted task");

        Ok(TaskOutcome { task, audit })
    }

    /// Get one task the actor may see
    pub fn get(&self, id: TaskId, actor: Actor<'_>) -> TrailResult<Task> {
        let task = self
            .storage
            .tasks
            .get(id)?
            .ok_or_else(|| TrailError::task_not_found(id.to_string()))?;
        actor.authorize(&task)?;
        Ok(task)
    }

    /// List the tasks the actor may see
    pub fn list(&self, filter: &TaskFilter, actor: Actor<'_>) -> TrailResult<Vec<Task>> {
        let mut tasks: Vec<Task> = self
            .storage
            .tasks
            .get_all()?
            .into_iter()
            .filter(|t| actor.can_access(t) && filter.matches(t))
            .collect();

        tasks.sort_by(|a, b| filter.compare(a, b));
        Ok(tasks)
    }

    fn require_user(&self, user_id: UserId) -> TrailResult<()> {
        self.storage
            .users
            .get(user_id)?
            .map(|_| ())
            .ok_or_else(|| TrailError::user_not_found(user_id.to_string()))
    }

    /// Run the audit hooks for a staged mutation, then persist it
    fn record_and_commit<F>(&self, hook: F) -> TrailResult<Vec<AuditEntry>>
    where
        F: FnOnce(&TaskAuditRecorder<'_, Storage>) -> TrailResult<Vec<AuditEntry>>,
    {
        let entries = hook(&TaskAuditRecorder::new(self.storage))?;
        self.storage.commit()?;
        Ok(entries)
    }

    /// Discard the staged audit entries once the caller has restored the task
    ///
    /// A failed commit may have written some files already, so the restored
    /// state is saved again.
    fn abort(&self, id: TaskId, operation: &str, error: TrailError) -> TrailError {
        warn!(task = %id, operation, %error, "task mutation failed, rolling back");
        if let Err(rollback) = self.storage.rollback_audits() {
            return rollback;
        }
        if let Err(resave) = self.storage.save_all() {
            warn!(task = %id, error = %resave, "could not restore files after rollback");
        }
        error
    }
}
