//! StateMachine
//!
//! Handles all database-related operations including:
//! - Applying committed log entries to the state machine
//! - Generating snapshot data representation (archive stream)
//! - Applying received snapshots to the underlying database
//! - Maintaining data consistency guarantees
//!
//! This is the capability contract a consensus engine drives; see
//! [`crate::KvStateMachine`] for the shipped implementation.

mod kv_state_machine;


pub use kv_state_machine::*;

use std::io::Read;
use std::io::Write;

#[cfg(test)]
use mockall::automock;

use crate::proto::Entry;
use crate::Result;

#[cfg_attr(test, automock)]
pub trait StateMachine: Send + Sync + 'static {
    /// Apply one committed entry to the active storage engine.
    ///
    /// The consensus engine delivers entries serialized and in index order;
    /// no internal locking is needed to preserve that ordering. A decode
    /// failure or unsupported action leaves storage untouched. The write is
    /// visible to [`Self::get`] as soon as this returns.
    fn apply(
        &self,
        entry: &Entry,
    ) -> Result<()>;

    fn get(
        &self,
        key: &[u8],
    ) -> Result<Option<Vec<u8>>>;

    /// Obtain a consistent read-only view of the active engine without
    /// blocking concurrent [`Self::apply`] calls.
    ///
    /// The returned handle decouples when the view was taken from when it is
    /// persisted. Fails only if the view cannot be obtained.
    fn snapshot(&self) -> Result<Box<dyn Persistable>>;

    /// Fully replace the active storage engine from an archive stream.
    ///
    /// Any failure during decode/unpack/open leaves the previously active
    /// engine untouched. The caller guarantees no [`Self::apply`] is in
    /// flight during a restore.
    fn restore(
        &self,
        stream: Box<dyn Read + Send>,
    ) -> Result<()>;

    /// Volatile (index, term) of the highest applied entry.
    fn last_applied(&self) -> (u64, u64);
}

/// A point-in-time snapshot handle returned by [`StateMachine::snapshot`].
pub trait Persistable: Send {
    /// Stream the snapshot into `sink` as a self-contained archive.
    ///
    /// At most one persist may be in flight against a given state machine at
    /// a time; concurrent attempts serialize. On any failure the sink is
    /// cancelled and no partial archive is committed.
    fn persist(
        &mut self,
        sink: &mut dyn SnapshotSink,
    ) -> Result<()>;

    /// Release the underlying storage view.
    ///
    /// A separate explicit step from persist, to be called once, always,
    /// regardless of persist's outcome.
    fn release(&mut self);
}

/// Destination for a persisted snapshot archive.
///
/// Treated as a fallible, possibly blocking resource: a write failure halts
/// the persist immediately and triggers [`SnapshotSink::cancel`].
pub trait SnapshotSink: Write + Send {
    /// Discard the partial output; no archive is committed.
    fn cancel(&mut self) -> std::io::Result<()>;

    /// Commit the completed archive.
    fn complete(&mut self) -> std::io::Result<()>;
}
