//! Storage initialization
//!
//! Handles first-run setup: directories, default settings and empty data files

use crate::config::{Settings, TrailPaths};
use crate::error::TrailError;

use super::file_io::write_json_atomic;

/// Initialize storage for a fresh installation
///
/// Existing files are left untouched. Returns `true` if settings were
/// created by this call.
pub fn initialize_storage(paths: &TrailPaths) -> Result<bool, TrailError> {
    paths.ensure_directories()?;

    for (file, key) in [
        (paths.tasks_file(), "tasks"),
        (paths.users_file(), "users"),
        (paths.audits_file(), "entries"),
    ] {
        if !file.exists() {
            write_json_atomic(&file, &serde_json::json!({ key: [] }))?;
        }
    }

    if paths.settings_file().exists() {
        return Ok(false);
    }

    Settings::default().save(paths)?;
    Ok(true)
}

/// Check if storage needs initialization
pub fn needs_initialization(paths: &TrailPaths) -> bool {
    !paths.is_initialized()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_initialize_storage() {
        let temp_dir = TempDir::new().unwrap();
        let paths = TrailPaths::with_base_dir(temp_dir.path().to_path_buf());

        assert!(needs_initialization(&paths));

        assert!(initialize_storage(&paths).unwrap());

        assert!(!needs_initialization(&paths));
        assert!(paths.tasks_file().exists());
        assert!(paths.users_file().exists());
        assert!(paths.audits_file().exists());
    }

    #[test]
    fn test_doesnt_overwrite_existing() {
        let temp_dir = TempDir::new().unwrap();
        let paths = TrailPaths::with_base_dir(temp_dir.path().to_path_buf());
        initialize_storage(&paths).unwrap();

        let mut settings = Settings::default();
        settings.notifications.due_window_days = 5;
        settings.save(&paths).unwrap();

        assert!(!initialize_storage(&paths).unwrap());

        let content = std::fs::read_to_string(paths.settings_file()).unwrap();
        let reloaded: Settings = serde_json::from_str(&content).unwrap();
        assert_eq!(reloaded.notifications.due_window_days, 5);
    }
}
