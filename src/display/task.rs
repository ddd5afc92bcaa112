//! Task display formatting
//!
//! Formats tasks for terminal output in list and detail views.

use crate::models::{Task, User};

/// Format a list of tasks as a table
pub fn format_task_list(tasks: &[Task]) -> String {
    if tasks.is_empty() {
        return "No tasks found.".to_string();
    }

    let title_width = tasks
        .iter()
        .map(|t| t.title.chars().count().min(40))
        .max()
        .unwrap_or(5)
        .max(5);

    let mut output = String::new();
    output.push_str(&format!(
        "{:<12}  {:<title_width$}  {:<11}  {:<8}  {:<10}\n",
        "ID",
        "Title",
        "Status",
        "Priority",
        "Due",
        title_width = title_width,
    ));

    output.push_str(&format!(
        "{:-<12}  {:-<title_width$}  {:-<11}  {:-<8}  {:-<10}\n",
        "",
        "",
        "",
        "",
        "",
        title_width = title_width,
    ));

    for task in tasks {
        output.push_str(&format!(
            "{:<12}  {:<title_width$}  {:<11}  {:<8}  {}\n",
            task.id.to_string(),
            truncate(&task.title, 40),
            task.status.map(|s| s.as_str()).unwrap_or("-"),
            task.priority.map(|p| p.as_str()).unwrap_or("-"),
            task.due_date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            title_width = title_width,
        ));
    }

    output
}

/// Format a single task's details
pub fn format_task_details(task: &Task, owner: Option<&User>) -> String {
    let mut output = String::new();

    output.push_str(&format!("Task: {}\n", task.title));
    output.push_str(&format!("  ID:        {}\n", task.id.as_uuid()));
    output.push_str(&format!(
        "  Status:    {}\n",
        task.status.map(|s| s.as_str()).unwrap_or("(none)")
    ));
    output.push_str(&format!(
        "  Priority:  {}\n",
        task.priority.map(|p| p.as_str()).unwrap_or("(none)")
    ));
    if let Some(due) = task.due_date {
        output.push_str(&format!("  Due:       {}\n", due.format("%Y-%m-%d")));
    }

    match (task.user_id, owner) {
        (_, Some(user)) => output.push_str(&format!("  Owner:     {}\n", user)),
        (Some(id), None) => output.push_str(&format!("  Owner:     {} (unknown)\n", id)),
        (None, None) => output.push_str("  Owner:     (unassigned)\n"),
    }

    if let Some(description) = &task.description {
        output.push('\n');
        output.push_str(&format!("  {}\n", description));
    }

    output.push('\n');
    output.push_str(&format!(
        "  Created:   {}\n",
        task.created_at.format("%Y-%m-%d %H:%M:%S")
    ));
    output.push_str(&format!(
        "  Modified:  {}\n",
        task.updated_at.format("%Y-%m-%d %H:%M:%S")
    ));

    output
}

pub(crate) fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Priority, Role, TaskStatus};
    use chrono::NaiveDate;

    #[test]
    fn test_format_task_list() {
        let mut task = Task::new("Water plants");
        task.priority = Some(Priority::High);
        task.due_date = NaiveDate::from_ymd_opt(2024, 5, 10);

        let output = format_task_list(&[task]);
        assert!(output.contains("Water plants"));
        assert!(output.contains("high"));
        assert!(output.contains("2024-05-10"));
    }

    #[test]
    fn test_empty_list() {
        assert_eq!(format_task_list(&[]), "No tasks found.");
    }

    #[test]
    fn test_details_show_owner_and_nulls() {
        let owner = User::new("Mia", "mia@example.com", Role::Member);
        let mut task = Task::new("Report");
        task.status = None;
        task.user_id = Some(owner.id);

        let output = format_task_details(&task, Some(&owner));
        assert!(output.contains("Mia <mia@example.com>"));
        assert!(output.contains("Status:    (none)"));

        task.status = Some(TaskStatus::InProgress);
        let output = format_task_details(&task, None);
        assert!(output.contains("in-progress"));
        assert!(output.contains("(unknown)"));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a very long title", 10), "a very ...");
    }
}
