//! TaskTrail - task management with a structured audit trail
//!
//! This library provides the core functionality for TaskTrail. Every task
//! mutation is classified into one or more immutable audit entries that can
//! later be queried per task, newest first.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Path resolution and settings
//! - `error`: Custom error types
//! - `models`: Core data models (tasks, users, ids)
//! - `audit`: Change classification, value formatting and the audit contracts
//! - `storage`: JSON file storage layer
//! - `services`: Business logic layer (the task mutation pipeline)
//! - `display`: Terminal formatting
//! - `cli`: Command handlers
//!
//! # Example
//!
//! ```rust,ignore
//! use tasktrail::config::TrailPaths;
//! use tasktrail::services::{Actor, NewTask, TaskService};
//! use tasktrail::storage::Storage;
//!
//! let mut storage = Storage::new(TrailPaths::new()?)?;
//! storage.load_all()?;
//! let outcome = TaskService::new(&storage).create(NewTask::new("Ship it"), Actor::System)?;
//! ```

pub mod audit;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod models;
pub mod services;
pub mod storage;

pub use error::{TrailError, TrailResult};
