//! State Machine Error Hierarchy
//!
//! Defines error types for the replicated key-value state machine core,
//! categorized by operational concern: command decoding, storage engine
//! failures, and snapshot persist/restore failures.

use std::path::PathBuf;

#[doc(hidden)]
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Command payload decoding and validation failures
    #[error(transparent)]
    Command(#[from] CommandError),

    /// Storage engine and filesystem failures
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Snapshot persist/restore failures
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    /// Configuration validation failures
    #[error("Config error: {0}")]
    Config(String),
}

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// Malformed command payload
    #[error("Failed to decode command payload: {0}")]
    Decode(#[from] prost::DecodeError),

    /// Structurally valid command carrying an action this state machine does
    /// not implement. The raw discriminant is kept for diagnostics.
    #[error("Unsupported action: {0}")]
    UnsupportedAction(i32),
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Disk I/O failures during engine/snapshot operations
    #[error(transparent)]
    IoError(#[from] std::io::Error),

    /// I/O failure with the offending path attached
    #[error("Error occurred at path: {path}")]
    PathError {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Embedded database errors
    #[error("Embedded database error: {0}")]
    DbError(String),
}

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// Failure while copying the view or writing to the sink
    #[error("Snapshot operation failed: {0}")]
    OperationFailed(String),

    /// Corrupt, truncated or non-gzip archive passed to restore
    #[error("Invalid snapshot archive: {0}")]
    InvalidFormat(String),

    /// Persist called twice, or after the handle was released
    #[error("Snapshot handle already consumed")]
    AlreadyConsumed,
}

// ============== Conversion Implementations ============== //
impl From<sled::Error> for Error {
    fn from(err: sled::Error) -> Self {
        StorageError::DbError(err.to_string()).into()
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        StorageError::IoError(err).into()
    }
}
