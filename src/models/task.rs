//! Task model
//!
//! A task is a mutable work item with a status, a priority, an optional due
//! date and an optional owning user.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ids::{TaskId, UserId};

/// Maximum accepted title length, in characters
pub const MAX_TITLE_LEN: usize = 255;

/// Workflow status of a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
}

impl TaskStatus {
    /// The stored string form ("pending", "in-progress", "completed")
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in-progress",
            Self::Completed => "completed",
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "in-progress" | "in_progress" | "inprogress" => Ok(Self::InProgress),
            "completed" | "done" => Ok(Self::Completed),
            other => Err(format!(
                "Invalid status '{}' (expected pending, in-progress or completed)",
                other
            )),
        }
    }
}

/// Task priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(format!(
                "Invalid priority '{}' (expected low, medium or high)",
                other
            )),
        }
    }
}

/// A tracked work item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,

    pub title: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub status: Option<TaskStatus>,

    #[serde(default)]
    pub priority: Option<Priority>,

    #[serde(default)]
    pub due_date: Option<NaiveDate>,

    /// Owning (assigned) user
    #[serde(default)]
    pub user_id: Option<UserId>,

    pub created_at: DateTime<Utc>,

    /// Bookkeeping timestamp, bumped on every mutation
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Create a new pending, medium-priority task
    pub fn new(title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: TaskId::new(),
            title: title.into(),
            description: None,
            status: Some(TaskStatus::Pending),
            priority: Some(Priority::Medium),
            due_date: None,
            user_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the task counts as finished for due-date reminders
    pub fn is_completed(&self) -> bool {
        self.status.is_some_and(|s| s.is_completed())
    }

    /// Whether `user_id` owns this task
    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.user_id == Some(user_id)
    }

    /// Mark the task as modified now
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Validate the task
    pub fn validate(&self) -> Result<(), TaskValidationError> {
        if self.title.trim().is_empty() {
            return Err(TaskValidationError::EmptyTitle);
        }

        let len = self.title.chars().count();
        if len > MAX_TITLE_LEN {
            return Err(TaskValidationError::TitleTooLong(len));
        }

        Ok(())
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title)
    }
}

/// Validation errors for tasks
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskValidationError {
    EmptyTitle,
    TitleTooLong(usize),
}

impl fmt::Display for TaskValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "Task title cannot be empty"),
            Self::TitleTooLong(len) => write!(
                f,
                "Task title too long ({} chars, max {})",
                len, MAX_TITLE_LEN
            ),
        }
    }
}

impl std::error::Error for TaskValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_task_defaults() {
        let task = Task::new("Write report");
        assert_eq!(task.title, "Write report");
        assert_eq!(task.status, Some(TaskStatus::Pending));
        assert_eq!(task.priority, Some(Priority::Medium));
        assert!(task.due_date.is_none());
        assert!(!task.is_completed());
    }

    #[test]
    fn test_status_wire_format() {
        assert_eq!(
            serde_json::to_string(&TaskStatus::InProgress).unwrap(),
            r#""in-progress""#
        );
        assert_eq!(TaskStatus::InProgress.to_string(), "in-progress");
        assert_eq!("in-progress".parse::<TaskStatus>(), Ok(TaskStatus::InProgress));
        assert!("archived".parse::<TaskStatus>().is_err());
    }

    #[test]
    fn test_priority_parse() {
        assert_eq!("HIGH".parse::<Priority>(), Ok(Priority::High));
        assert!("urgent".parse::<Priority>().is_err());
    }

    #[test]
    fn test_validation() {
        let mut task = Task::new("Valid");
        assert!(task.validate().is_ok());

        task.title = "   ".into();
        assert_eq!(task.validate(), Err(TaskValidationError::EmptyTitle));

        task.title = "a".repeat(MAX_TITLE_LEN + 1);
        assert!(matches!(
            task.validate(),
            Err(TaskValidationError::TitleTooLong(_))
        ));
    }

    #[test]
    fn test_null_status_is_not_completed() {
        let mut task = Task::new("Loose end");
        task.status = None;
        assert!(!task.is_completed());
    }

    #[test]
    fn test_serialization() {
        let mut task = Task::new("Ship it");
        task.due_date = NaiveDate::from_ymd_opt(2026, 3, 1);

        let json = serde_json::to_string(&task).unwrap();
        assert!(json.contains(r#""due_date":"2026-03-01""#));

        let deserialized: Task = serde_json::from_str(&json).unwrap();
        assert_eq!(task, deserialized);
    }
}
