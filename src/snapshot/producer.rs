//! Turns a storage view into a self-contained archive stream.

use std::io::Write;
use std::marker::PhantomData;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;
use tracing::error;
use tracing::warn;

use crate::config::StorageConfig;
use crate::snapshot::archive;
use crate::state_machine::Persistable;
use crate::state_machine::SnapshotSink;
use crate::storage::EngineView;
use crate::storage::StorageEngine;
use crate::utils::ScratchDir;
use crate::Result;
use crate::SnapshotError;

/// A point-in-time snapshot of the key-value state machine.
///
/// Holds the storage view until the snapshot is persisted or released.
/// Persisting first copies the view into a fresh scratch engine, which
/// decouples the archive from the original view's lifetime and from any
/// background restructuring the live engine performs.
pub struct KvSnapshot<E: StorageEngine> {
    view: Option<EngineView>,
    config: StorageConfig,
    snapshot_lock: Arc<Mutex<()>>,
    _engine: PhantomData<E>,
}

impl<E: StorageEngine> KvSnapshot<E> {
    pub(crate) fn new(
        view: EngineView,
        config: StorageConfig,
        snapshot_lock: Arc<Mutex<()>>,
    ) -> Self {
        KvSnapshot {
            view: Some(view),
            config,
            snapshot_lock,
            _engine: PhantomData,
        }
    }

    /// Copy every pair of the view into a fresh engine under `scratch`, then
    /// stream that engine's directory tree into the sink.
    fn persist_into(
        view: EngineView,
        scratch: &ScratchDir,
        sink: &mut dyn SnapshotSink,
    ) -> Result<()> {
        let copy = E::open(scratch.path())?;
        for item in view {
            let (key, value) = item?;
            copy.put(&key, &value)?;
        }
        copy.flush()?;

        // Close the copy so its directory tree is complete on disk before
        // archiving.
        drop(copy);

        archive::pack(scratch.path(), SinkWriter(sink))?;
        Ok(())
    }
}

impl<E: StorageEngine> Persistable for KvSnapshot<E> {
    fn persist(
        &mut self,
        sink: &mut dyn SnapshotSink,
    ) -> Result<()> {
        // Serialize against restores and other persists.
        let lock = Arc::clone(&self.snapshot_lock);
        let _guard = lock.lock();

        let view = self.view.take().ok_or(SnapshotError::AlreadyConsumed)?;
        let scratch = ScratchDir::create(&self.config.scratch_root, &self.config.scratch_prefix)?;

        // The scratch engine is removed on every exit path below; only the
        // sink decides whether an archive was committed.
        match Self::persist_into(view, &scratch, sink) {
            Ok(()) => {
                sink.complete().map_err(|e| {
                    error!("Failed to complete snapshot sink: {}", e);
                    SnapshotError::OperationFailed(format!(
                        "Failed to complete snapshot sink: {e}"
                    ))
                })?;
                debug!("snapshot persisted");
                Ok(())
            }
            Err(e) => {
                error!("Snapshot persist failed: {}", e);
                if let Err(cancel_err) = sink.cancel() {
                    warn!("Failed to cancel snapshot sink: {}", cancel_err);
                }
                Err(e)
            }
        }
    }

    fn release(&mut self) {
        self.view.take();
    }
}

/// Adapter so the archive codec can treat a sink trait object as a plain
/// writer.
struct SinkWriter<'a>(&'a mut dyn SnapshotSink);

impl Write for SinkWriter<'_> {
    fn write(
        &mut self,
        buf: &[u8],
    ) -> std::io::Result<usize> {
        self.0.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.0.flush()
    }
}
