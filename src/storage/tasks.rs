//! Task repository for JSON storage
//!
//! Manages loading and saving tasks to tasks.json

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::TrailError;
use crate::models::{Task, TaskId, UserId};

use super::file_io::{read_json, write_json_atomic};

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct TaskData {
    tasks: Vec<Task>,
}

/// Repository for task persistence
pub struct TaskRepository {
    path: PathBuf,
    data: RwLock<HashMap<TaskId, Task>>,
}

impl TaskRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
        }
    }

    /// Load tasks from disk
    pub fn load(&self) -> Result<(), TrailError> {
        let file_data: TaskData = read_json(&self.path)?;

        let mut data = self.data.write().map_err(|e| {
            TrailError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;

        data.clear();
        for task in file_data.tasks {
            data.insert(task.id, task);
        }

        Ok(())
    }

    /// Save tasks to disk, oldest first
    pub fn save(&self) -> Result<(), TrailError> {
        let data = self.data.read().map_err(|e| {
            TrailError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;

        let mut tasks: Vec<_> = data.values().cloned().collect();
        tasks.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));

        write_json_atomic(&self.path, &TaskData { tasks })
    }

    pub fn get(&self, id: TaskId) -> Result<Option<Task>, TrailError> {
        let data = self.data.read().map_err(|e| {
            TrailError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(data.get(&id).cloned())
    }

    /// Find a task by full id, prefixed short id, or id prefix
    pub fn find(&self, identifier: &str) -> Result<Option<Task>, TrailError> {
        if let Ok(id) = identifier.parse::<TaskId>() {
            if let Some(task) = self.get(id)? {
                return Ok(Some(task));
            }
        }

        let data = self.data.read().map_err(|e| {
            TrailError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;

        let mut matches = data.values().filter(|t| t.id.matches(identifier));
        match (matches.next(), matches.next()) {
            (Some(task), None) => Ok(Some(task.clone())),
            (Some(_), Some(_)) => Err(TrailError::Validation(format!(
                "Ambiguous task id '{}'",
                identifier
            ))),
            _ => Ok(None),
        }
    }

    /// All tasks, oldest first
    pub fn get_all(&self) -> Result<Vec<Task>, TrailError> {
        let data = self.data.read().map_err(|e| {
            TrailError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;

        let mut tasks: Vec<_> = data.values().cloned().collect();
        tasks.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(tasks)
    }

    /// Insert or update a task
    pub fn upsert(&self, task: Task) -> Result<(), TrailError> {
        let mut data = self.data.write().map_err(|e| {
            TrailError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;

        data.insert(task.id, task);
        Ok(())
    }

    /// Remove a task, returning it if it existed
    pub fn delete(&self, id: TaskId) -> Result<Option<Task>, TrailError> {
        let mut data = self.data.write().map_err(|e| {
            TrailError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;

        Ok(data.remove(&id))
    }

    pub fn exists(&self, id: TaskId) -> Result<bool, TrailError> {
        let data = self.data.read().map_err(|e| {
            TrailError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(data.contains_key(&id))
    }

    /// Unassign every task owned by `user_id`, returning how many changed
    pub fn clear_owner(&self, user_id: UserId) -> Result<usize, TrailError> {
        let mut data = self.data.write().map_err(|e| {
            TrailError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;

        let mut cleared = 0;
        for task in data.values_mut().filter(|t| t.user_id == Some(user_id)) {
            task.user_id = None;
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
