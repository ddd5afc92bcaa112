//! Due-soon notifications
//!
//! The scanner reads task state only; it never touches the audit trail.
//! Matches are handed to a [`NotificationQueue`], an append-only JSONL
//! outbox. Delivery is someone else's job.
//!
//! Recipient policy: the assigned user's email, falling back to the
//! configured admin address. Tasks with neither are skipped.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;

use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::NotificationSettings;
use crate::error::{TrailError, TrailResult};
use crate::models::{Task, TaskId};
use crate::storage::Storage;

/// One task that is due soon or overdue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DueNotice {
    pub task_id: TaskId,
    pub title: String,
    pub due_date: NaiveDate,
    /// Negative when overdue
    pub days_until_due: i64,
    pub recipient: String,
}

impl DueNotice {
    pub fn is_overdue(&self) -> bool {
        self.days_until_due < 0
    }

    /// "OVERDUE (n days ago)", "TODAY" or "in n day(s)"
    pub fn status_text(&self) -> String {
        match self.days_until_due {
            d if d < 0 => format!("OVERDUE ({} days ago)", d.abs()),
            0 => "TODAY".to_string(),
            d => format!("in {} day(s)", d),
        }
    }
}

/// Result of one scan
#[derive(Debug, Clone)]
pub struct ScanReport {
    /// First and last day of the due-soon window, inclusive
    pub window: (NaiveDate, NaiveDate),
    /// Earliest overdue date considered, if overdue tasks were checked
    pub overdue_since: Option<NaiveDate>,
    pub notices: Vec<DueNotice>,
    /// Matches dropped for lack of a recipient
    pub skipped: usize,
}

/// Finds tasks that need a reminder
pub struct DueTaskScanner<'a> {
    storage: &'a Storage,
    settings: &'a NotificationSettings,
}

impl<'a> DueTaskScanner<'a> {
    pub fn new(storage: &'a Storage, settings: &'a NotificationSettings) -> Self {
        Self { storage, settings }
    }

    /// Scan all tasks relative to `today`
    pub fn scan(&self, today: NaiveDate) -> TrailResult<ScanReport> {
        let window_end = today
            .checked_add_days(Days::new(u64::from(self.settings.due_window_days)))
            .ok_or_else(|| TrailError::Config("Due window is out of range".into()))?;

        let overdue_since = if self.settings.check_overdue {
            Some(
                today
                    .checked_sub_days(Days::new(u64::from(self.settings.overdue_window_days)))
                    .ok_or_else(|| TrailError::Config("Overdue window is out of range".into()))?,
            )
        } else {
            None
        };

        let mut notices = Vec::new();
        let mut skipped = 0;

        for task in self.storage.tasks.get_all()? {
            if task.is_completed() {
                continue;
            }
            let Some(due) = task.due_date else {
                continue;
            };

            let upcoming = today <= due && due <= window_end;
            let overdue = overdue_since.is_some_and(|since| since <= due && due < today);
            if !upcoming && !overdue {
                continue;
            }

            match self.recipient_for(&task)? {
                Some(recipient) => notices.push(DueNotice {
                    task_id: task.id,
                    title: task.title.clone(),
                    due_date: due,
                    days_until_due: (due - today).num_days(),
                    recipient,
                }),
                None => {
                    warn!(task = %task.id, "no recipient for due task, skipping");
                    skipped += 1;
                }
            }
        }

        notices.sort_by(|a, b| a.due_date.cmp(&b.due_date).then(a.title.cmp(&b.title)));

        Ok(ScanReport {
            window: (today, window_end),
            overdue_since,
            notices,
            skipped,
        })
    }

    fn recipient_for(&self, task: &Task) -> TrailResult<Option<String>> {
        if let Some(user_id) = task.user_id {
            if let Some(user) = self.storage.users.get(user_id)? {
                return Ok(Some(user.email));
            }
        }
        Ok(self.settings.admin_email.clone())
    }
}

#[derive(Serialize)]
struct OutboxLine<'n> {
    queued_at: DateTime<Utc>,
    #[serde(flatten)]
    notice: &'n DueNotice,
}

/// Append-only outbox of notices awaiting delivery
pub struct NotificationQueue {
    path: PathBuf,
}

impl NotificationQueue {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Enqueue notices, returning how many were written
    pub fn enqueue(&self, notices: &[DueNotice]) -> TrailResult<usize> {
        if notices.is_empty() {
            return Ok(0);
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| TrailError::Io(format!("Failed to open outbox: {}", e)))?;

        let queued_at = Utc::now();
        for notice in notices {
            let line = serde_json::to_string(&OutboxLine { queued_at, notice })
                .map_err(|e| TrailError::Json(format!("Failed to serialize notice: {}", e)))?;
            writeln!(file, "{}", line)
                .map_err(|e| TrailError::Io(format!("Failed to write notice: {}", e)))?;
            info!(task = %notice.task_id, recipient = %notice.recipient, "queued due notice");
        }

        file.flush()
            .map_err(|e| TrailError::Io(format!("Failed to flush outbox: {}", e)))?;

        Ok(notices.len())
    }

    /// Every queued notice, oldest first
    pub fn read_all(&self) -> TrailResult<Vec<DueNotice>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.path)
            .map_err(|e| TrailError::Io(format!("Failed to open outbox: {}", e)))?;

        let mut notices = Vec::new();
        for line in BufReader::new(file).lines() {
            let line = line.map_err(|e| TrailError::Io(format!("Failed to read outbox: {}", e)))?;
            if line.trim().is_empty() {
                continue;
            }
            notices.push(serde_json::from_str(&line)?);
        }
        Ok(notices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TrailPaths;
    use crate::models::{Role, TaskStatus, User};
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = TrailPaths::with_base_dir(temp_dir.path().to_path_buf());
        let mut storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();
        (temp_dir, storage)
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn due_task(storage: &Storage, title: &str, due: &str) -> Task {
        let mut task = Task::new(title);
        task.due_date = Some(date(due));
        storage.tasks.upsert(task.clone()).unwrap();
        task
    }

    fn settings_with_admin() -> NotificationSettings {
        NotificationSettings {
            admin_email: Some("admin@example.com".into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_window_bounds() {
        let (_temp_dir, storage) = create_test_storage();
        due_task(&storage, "today", "2024-05-10");
        due_task(&storage, "tomorrow", "2024-05-11");
        due_task(&storage, "later", "2024-05-12");
        due_task(&storage, "recently late", "2024-04-10");
        due_task(&storage, "long ago", "2024-04-09");

        let settings = settings_with_admin();
        let report = DueTaskScanner::new(&storage, &settings)
            .scan(date("2024-05-10"))
            .unwrap();

        let titles: Vec<_> = report.notices.iter().map(|n| n.title.as_str()).collect();
        assert_eq!(titles, vec!["recently late", "today", "tomorrow"]);
        assert_eq!(report.window, (date("2024-05-10"), date("2024-05-11")));
        assert_eq!(report.overdue_since, Some(date("2024-04-10")));
    }

    #[test]
    fn test_overdue_disabled_and_completed_skipped() {
        let (_temp_dir, storage) = create_test_storage();
        due_task(&storage, "late", "2024-05-09");
        let mut done = due_task(&storage, "done", "2024-05-10");
        done.status = Some(TaskStatus::Completed);
        storage.tasks.upsert(done).unwrap();

        let settings = NotificationSettings {
            check_overdue: false,
            ..settings_with_admin()
        };
        let report = DueTaskScanner::new(&storage, &settings)
            .scan(date("2024-05-10"))
            .unwrap();

        assert!(report.notices.is_empty());
        assert_eq!(report.overdue_since, None);
    }

    #[test]
    fn test_recipient_policy() {
        let (_temp_dir, storage) = create_test_storage();
        let user = User::new("Mia", "mia@example.com", Role::Member);
        storage.users.upsert(user.clone()).unwrap();
        let mut assigned = due_task(&storage, "assigned", "2024-05-10");
        assigned.user_id = Some(user.id);
        storage.tasks.upsert(assigned).unwrap();
        due_task(&storage, "unassigned", "2024-05-10");

        let settings = settings_with_admin();
        let report = DueTaskScanner::new(&storage, &settings)
            .scan(date("2024-05-10"))
            .unwrap();
        let recipients: Vec<_> = report
            .notices
            .iter()
            .map(|n| (n.title.as_str(), n.recipient.as_str()))
            .collect();
        assert_eq!(
            recipients,
            vec![
                ("assigned", "mia@example.com"),
                ("unassigned", "admin@example.com")
            ]
        );

        let no_admin = NotificationSettings::default();
        let report = DueTaskScanner::new(&storage, &no_admin)
            .scan(date("2024-05-10"))
            .unwrap();
        assert_eq!(report.notices.len(), 1);
        assert_eq!(report.skipped, 1);
    }

    #[test]
    fn test_status_text() {
        let notice = |days| DueNotice {
            task_id: TaskId::new(),
            title: "t".into(),
            due_date: date("2024-05-10"),
            days_until_due: days,
            recipient: "r@example.com".into(),
        };
        assert_eq!(notice(-3).status_text(), "OVERDUE (3 days ago)");
        assert!(notice(-3).is_overdue());
        assert_eq!(notice(0).status_text(), "TODAY");
        assert_eq!(notice(2).status_text(), "in 2 day(s)");
    }

    #[test]
    fn test_queue_appends() {
        let temp_dir = TempDir::new().unwrap();
        let queue = NotificationQueue::new(temp_dir.path().join("outbox.jsonl"));
        let notice = DueNotice {
            task_id: TaskId::new(),
            title: "Pay rent".into(),
            due_date: date("2024-05-10"),
            days_until_due: 1,
            recipient: "admin@example.com".into(),
        };

        assert_eq!(queue.enqueue(&[]).unwrap(), 0);
        assert_eq!(queue.enqueue(&[notice.clone()]).unwrap(), 1);
        assert_eq!(queue.enqueue(&[notice.clone()]).unwrap(), 1);

        let queued = queue.read_all().unwrap();
        assert_eq!(queued, vec![notice.clone(), notice]);
    }
}
