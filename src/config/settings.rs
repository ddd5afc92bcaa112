//! User settings for TaskTrail
//!
//! Settings live in `config.json`. The notification values can also be
//! overridden from the environment (`ADMIN_EMAIL`, `TASK_DUE_NOTIFICATION_DAYS`,
//! `TASK_CHECK_OVERDUE`), which take precedence over the stored file.

use serde::{Deserialize, Serialize};

use super::paths::TrailPaths;
use crate::error::TrailError;

/// Due-soon scan settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationSettings {
    /// How many days ahead of today a due date counts as "due soon"
    #[serde(default = "default_due_window_days")]
    pub due_window_days: u32,

    /// Whether overdue tasks are included in the scan
    #[serde(default = "default_check_overdue")]
    pub check_overdue: bool,

    /// How far back an overdue task is still reported
    #[serde(default = "default_overdue_window_days")]
    pub overdue_window_days: u32,

    /// Fallback recipient when a task has no assigned user
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_email: Option<String>,
}

fn default_due_window_days() -> u32 {
    1
}

fn default_check_overdue() -> bool {
    true
}

fn default_overdue_window_days() -> u32 {
    30
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            due_window_days: default_due_window_days(),
            check_overdue: default_check_overdue(),
            overdue_window_days: default_overdue_window_days(),
            admin_email: None,
        }
    }
}

/// User settings for TaskTrail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    #[serde(default)]
    pub notifications: NotificationSettings,
}

fn default_schema_version() -> u32 {
    1
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            notifications: NotificationSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings from disk, or default settings if the file doesn't exist
    ///
    /// Environment overrides are applied on top of whatever was loaded.
    pub fn load_or_create(paths: &TrailPaths) -> Result<Self, TrailError> {
        let settings_path = paths.settings_file();

        let mut settings = if settings_path.exists() {
            let contents = std::fs::read_to_string(&settings_path)
                .map_err(|e| TrailError::Io(format!("Failed to read settings file: {}", e)))?;

            serde_json::from_str(&contents)
                .map_err(|e| TrailError::Config(format!("Failed to parse settings file: {}", e)))?
        } else {
            Settings::default()
        };

        settings.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(settings)
    }

    /// Apply overrides from a key lookup (the process environment in production)
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), TrailError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(email) = lookup("ADMIN_EMAIL").filter(|e| !e.trim().is_empty()) {
            self.notifications.admin_email = Some(email.trim().to_string());
        }

        if let Some(days) = lookup("TASK_DUE_NOTIFICATION_DAYS") {
            self.notifications.due_window_days = days.trim().parse().map_err(|_| {
                TrailError::Config(format!("Invalid TASK_DUE_NOTIFICATION_DAYS: '{}'", days))
            })?;
        }

        if let Some(flag) = lookup("TASK_CHECK_OVERDUE") {
            self.notifications.check_overdue = parse_flag(&flag).ok_or_else(|| {
                TrailError::Config(format!("Invalid TASK_CHECK_OVERDUE: '{}'", flag))
            })?;
        }

        Ok(())
    }

    /// Save settings to disk
    pub fn save(&self, paths: &TrailPaths) -> Result<(), TrailError> {
        paths.ensure_directories()?;

        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| TrailError::Config(format!("Failed to serialize settings: {}", e)))?;

        std::fs::write(paths.settings_file(), contents)
            .map_err(|e| TrailError::Io(format!("Failed to write settings file: {}", e)))?;

        Ok(())
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.notifications.due_window_days, 1);
        assert!(settings.notifications.check_overdue);
        assert_eq!(settings.notifications.overdue_window_days, 30);
        assert!(settings.notifications.admin_email.is_none());
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let paths = TrailPaths::with_base_dir(temp_dir.path().to_path_buf());

        let mut settings = Settings::default();
        settings.notifications.due_window_days = 3;
        settings.save(&paths).unwrap();

        let contents = std::fs::read_to_string(paths.settings_file()).unwrap();
        let loaded: Settings = serde_json::from_str(&contents).unwrap();
        assert_eq!(loaded.notifications.due_window_days, 3);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"notifications": {}}"#).unwrap();
        assert_eq!(settings.schema_version, 1);
        assert_eq!(settings.notifications, NotificationSettings::default());
    }

    #[test]
    fn test_env_overrides() {
        let mut settings = Settings::default();
        settings
            .apply_overrides(lookup_from(&[
                ("ADMIN_EMAIL", "admin@example.com"),
                ("TASK_DUE_NOTIFICATION_DAYS", "7"),
                ("TASK_CHECK_OVERDUE", "false"),
            ]))
            .unwrap();

        assert_eq!(
            settings.notifications.admin_email.as_deref(),
            Some("admin@example.com")
        );
        assert_eq!(settings.notifications.due_window_days, 7);
        assert!(!settings.notifications.check_overdue);
    }

    #[test]
    fn test_invalid_override_is_config_error() {
        let mut settings = Settings::default();
        let result =
            settings.apply_overrides(lookup_from(&[("TASK_DUE_NOTIFICATION_DAYS", "soon")]));
        assert!(matches!(result, Err(TrailError::Config(_))));
    }

    #[test]
    fn test_blank_admin_email_ignored() {
        let mut settings = Settings::default();
        settings
            .apply_overrides(lookup_from(&[("ADMIN_EMAIL", "  ")]))
            .unwrap();
        assert!(settings.notifications.admin_email.is_none());
    }
}
