//! Configuration module for TaskTrail
//!
//! This module provides configuration management including:
//! - Data directory resolution
//! - Settings persistence with environment overrides

pub mod paths;
pub mod settings;

pub use paths::TrailPaths;
pub use settings::{NotificationSettings, Settings};
