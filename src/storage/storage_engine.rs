//! StorageEngine
//!
//! The capability contract the state machine core depends on. The core never
//! touches a concrete engine's full interface: anything with durable
//! directory-rooted persistence, point reads/writes and an ordered
//! point-in-time view can back the state machine.
//!
//! Closing an engine is dropping it.

use std::path::Path;

#[cfg(test)]
use mockall::automock;

use crate::Result;

/// An owned key/value pair yielded by an engine view.
pub type KvPair = (Vec<u8>, Vec<u8>);

/// Ordered iteration over every pair of an engine, taken at the instant
/// [`StorageEngine::view`] returns.
///
/// Each yielded value equals some value its key held at a real instant;
/// a view never observes a torn write.
pub type EngineView = Box<dyn Iterator<Item = Result<KvPair>> + Send>;

#[cfg_attr(test, automock)]
pub trait StorageEngine: Send + Sync + Sized + 'static {
    /// Open (or create) an engine rooted at `dir`.
    fn open(dir: &Path) -> Result<Self>;

    /// Durably associate `key` with `value`. Visible to [`Self::get`] as
    /// soon as this returns.
    fn put(
        &self,
        key: &[u8],
        value: &[u8],
    ) -> Result<()>;

    fn get(
        &self,
        key: &[u8],
    ) -> Result<Option<Vec<u8>>>;

    /// Point-in-time view for snapshot generation, fixed at the moment this
    /// returns. Concurrent writes proceed on the live engine but are never
    /// observed by the returned view.
    fn view(&self) -> Result<EngineView>;

    /// Flush buffered writes to disk.
    fn flush(&self) -> Result<()>;

    /// Directory this engine is rooted at.
    fn dir(&self) -> &Path;
}
