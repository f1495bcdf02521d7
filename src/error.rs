//! Error taxonomy for the snapshot core (see SPEC_FULL.md §7).

use thiserror::Error;

/// Error surfaced by the hand-rolled connection layer (`channel`). Kept
/// separate from [`SnapshotError`] because a `ConnectionError` means
/// different things depending on where it occurs: a failed `SHOW TABLES`
/// for one database is a [`SnapshotError::Transient`], but the same error
/// during `START TRANSACTION` is a [`SnapshotError::Fatal`].
#[derive(Debug, Error)]
#[error("{0}")]
pub struct ConnectionError(pub String);

impl ConnectionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

impl From<std::io::Error> for ConnectionError {
    fn from(err: std::io::Error) -> Self {
        ConnectionError(err.to_string())
    }
}

/// Error taxonomy for the snapshot subsystem (SPEC_FULL.md §7).
///
/// Only [`SnapshotError::Transient`] raised during the Step-5 database
/// enumeration is recovered locally by the orchestrator; every other
/// variant surfaces through the reader's failure channel after cleanup
/// (unlock + rollback) has run.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// Invalid or conflicting configuration. Reported before a reader is
    /// ever started.
    #[error("invalid snapshot configuration: {0}")]
    Config(String),

    /// The server cannot satisfy a snapshot invariant (binlog disabled,
    /// missing grants).
    #[error("snapshot precondition not satisfied: {0}")]
    Precondition(String),

    /// A single table's metadata could not be read. Logged and the table
    /// is skipped; never fatal on its own.
    #[error("transient error on {table}: {message}")]
    Transient { table: String, message: String },

    /// Lock acquisition, transaction start, or row scan failed outright.
    #[error("fatal snapshot error: {0}")]
    Fatal(String),

    /// The reader's cancellation flag was observed while blocked.
    #[error("snapshot cancelled")]
    Cancelled,
}

impl From<ConnectionError> for SnapshotError {
    fn from(err: ConnectionError) -> Self {
        SnapshotError::Fatal(err.0)
    }
}

pub type SnapshotResult<T> = Result<T, SnapshotError>;
