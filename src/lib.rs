//! MySQL snapshot core: takes a consistent, lock-coordinated snapshot of a
//! set of databases/tables and emits it as an ordered stream of
//! [`model::ChangeEvent`]/[`model::SchemaChange`] records, the same shape a
//! downstream change-data-capture pipeline consumes from the binlog.
//!
//! [`lifecycle::SnapshotReader`] is the entry point most callers want: it
//! owns the worker thread, the cancellation token, and the channel a caller
//! polls for output. [`orchestrator::run_snapshot`] is the synchronous,
//! single-threaded protocol implementation it drives.

pub mod channel;
pub mod config;
pub mod error;
pub mod filters;
pub mod lifecycle;
pub mod metrics;
pub mod model;
pub mod orchestrator;
pub mod probe;
pub mod protocol;
pub mod queue;
pub mod record;
pub mod schema;
pub mod sink;
pub mod utils;
