//! Audit trail for TaskTrail
//!
//! Every task mutation is classified into one or more immutable audit
//! entries.
//!
//! # Architecture
//!
//! - `format`: normalizes heterogeneous field values into canonical strings.
//! - `classify`: decides which records a create, update or delete produces.
//! - `recorder`: the lifecycle hooks the task pipeline calls, appending
//!   through the `AuditStore` primitive.
//! - `entry`: the persisted `AuditEntry` and its typed metadata.
//! - `query`: the retrieval contract (`AuditQuery`) and presentation join.
//! - `journal`: an append-only JSONL mirror of every entry ever written.
//!
//! # Example
//!
//! ```rust,ignore
//! use tasktrail::audit::{AuditRecorder, TaskAuditRecorder};
//!
//! let recorder = TaskAuditRecorder::new(&storage);
//! recorder.on_updated(&before, &after, Some(actor.id))?;
//! ```

pub mod classify;
mod entry;
pub mod format;
mod journal;
mod query;
mod recorder;

pub use classify::{AuditDescriptor, Snapshot, BOOKKEEPING_FIELDS};
pub use entry::{
    AuditAction, AuditEntry, AuditMetadata, CreatedMeta, DeletedMeta, FieldChange, StatusMeta,
    MULTIPLE_FIELDS, STATUS_FIELD,
};
pub use format::{format_value, FieldValue};
pub use journal::AuditJournal;
pub use query::{ActorSummary, AuditQuery, AuditRecord, UNKNOWN_USER};
pub use recorder::{AuditRecorder, AuditStore, TaskAuditRecorder};
