//! Path management for TaskTrail
//!
//! ## Path Resolution Order
//!
//! 1. `TASKTRAIL_DATA_DIR` environment variable (if set)
//! 2. The platform config directory for `tasktrail`

use std::path::PathBuf;

use directories::ProjectDirs;

use crate::error::TrailError;

/// Manages all paths used by TaskTrail
#[derive(Debug, Clone)]
pub struct TrailPaths {
    base_dir: PathBuf,
}

impl TrailPaths {
    /// Resolve the base directory from the environment or the platform default
    ///
    /// # Errors
    ///
    /// Returns an error if no home directory can be determined.
    pub fn new() -> Result<Self, TrailError> {
        let base_dir = if let Ok(custom) = std::env::var("TASKTRAIL_DATA_DIR") {
            PathBuf::from(custom)
        } else {
            ProjectDirs::from("", "", "tasktrail")
                .map(|dirs| dirs.config_dir().to_path_buf())
                .ok_or_else(|| {
                    TrailError::Config("Could not determine a home directory".into())
                })?
        };

        Ok(Self { base_dir })
    }

    /// Create TrailPaths with a custom base directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Directory holding the JSON entity files
    pub fn data_dir(&self) -> PathBuf {
        self.base_dir.join("data")
    }

    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// Append-only JSONL journal mirroring every audit entry ever written
    pub fn audit_journal(&self) -> PathBuf {
        self.base_dir.join("audit.log")
    }

    /// JSONL queue of due-soon notifications awaiting delivery
    pub fn outbox_file(&self) -> PathBuf {
        self.base_dir.join("outbox.jsonl")
    }

    pub fn tasks_file(&self) -> PathBuf {
        self.data_dir().join("tasks.json")
    }

    pub fn users_file(&self) -> PathBuf {
        self.data_dir().join("users.json")
    }

    pub fn audits_file(&self) -> PathBuf {
        self.data_dir().join("audits.json")
    }

    /// Ensure the base and data directories exist
    pub fn ensure_directories(&self) -> Result<(), TrailError> {
        std::fs::create_dir_all(&self.base_dir)
            .map_err(|e| TrailError::Io(format!("Failed to create base directory: {}", e)))?;

        std::fs::create_dir_all(self.data_dir())
            .map_err(|e| TrailError::Io(format!("Failed to create data directory: {}", e)))?;

        Ok(())
    }

    /// Check if TaskTrail has been initialized (config file exists)
    pub fn is_initialized(&self) -> bool {
        self.settings_file().exists()
    }
}
