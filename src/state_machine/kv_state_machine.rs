//! Key-value state machine over a swappable storage engine.

use std::fs;
use std::io::Read;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use arc_swap::ArcSwap;
use parking_lot::Mutex;
use prost::Message;
use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::config::CleanupPolicy;
use crate::config::FsmConfig;
use crate::proto::Action;
use crate::proto::Entry;
use crate::proto::WriteCommand;
use crate::snapshot::install;
use crate::snapshot::KvSnapshot;
use crate::state_machine::Persistable;
use crate::state_machine::StateMachine;
use crate::storage::StorageEngine;
use crate::utils::ScratchDir;
use crate::CommandError;
use crate::Result;

pub struct KvStateMachine<E: StorageEngine> {
    config: FsmConfig,

    /// The single active engine. Swapped in one step on restore: apply and
    /// get observe either the old-complete or the new-complete instance,
    /// never anything in between.
    engine: ArcSwap<E>,

    /// Volatile state:
    /// index/term of the highest log entry applied to the state machine
    /// (atomic operation ensures lock-free)
    last_applied_index: AtomicU64,
    last_applied_term: AtomicU64,

    /// Serializes snapshot persists against restores; shared into every
    /// in-flight snapshot handle
    snapshot_lock: Arc<Mutex<()>>,
}

impl<E: StorageEngine> std::fmt::Debug for KvStateMachine<E> {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("KvStateMachine")
            .field("engine_dir", &self.engine.load().dir())
            .finish()
    }
}

impl<E: StorageEngine> KvStateMachine<E> {
    /// Create a state machine backed by a fresh scratch engine under the
    /// configured scratch root.
    pub fn new(config: FsmConfig) -> Result<Self> {
        config.validate()?;

        let scratch = ScratchDir::create(
            &config.storage.scratch_root,
            &config.storage.scratch_prefix,
        )?;
        let engine = E::open(scratch.path())?;
        let dir = scratch.into_path();
        debug!("state machine engine opened at {:?}", dir);

        Ok(KvStateMachine {
            config,
            engine: ArcSwap::from_pointee(engine),

            last_applied_index: AtomicU64::new(0),
            last_applied_term: AtomicU64::new(0),

            snapshot_lock: Arc::new(Mutex::new(())),
        })
    }

    /// Decode the payload and insist on a WRITE action.
    ///
    /// Rejection happens here at apply time, not decode time: an unknown
    /// discriminant still decodes and surfaces as `UnsupportedAction`.
    fn decode_write(payload: &[u8]) -> Result<WriteCommand> {
        let cmd = WriteCommand::decode(payload).map_err(CommandError::Decode)?;
        match Action::try_from(cmd.action) {
            Ok(Action::Write) => Ok(cmd),
            _ => Err(CommandError::UnsupportedAction(cmd.action).into()),
        }
    }
}

impl<E: StorageEngine> StateMachine for KvStateMachine<E> {
    fn apply(
        &self,
        entry: &Entry,
    ) -> Result<()> {
        let cmd = Self::decode_write(&entry.payload)?;

        debug!(index = entry.index, "applying WRITE command");
        self.engine.load().put(&cmd.key, &cmd.value)?;

        self.last_applied_index.store(entry.index, Ordering::SeqCst);
        self.last_applied_term.store(entry.term, Ordering::SeqCst);
        Ok(())
    }

    fn get(
        &self,
        key: &[u8],
    ) -> Result<Option<Vec<u8>>> {
        self.engine.load().get(key)
    }

    fn snapshot(&self) -> Result<Box<dyn Persistable>> {
        let view = self.engine.load().view()?;
        debug!("snapshot view taken");

        Ok(Box::new(KvSnapshot::<E>::new(
            view,
            self.config.storage.clone(),
            Arc::clone(&self.snapshot_lock),
        )))
    }

    fn restore(
        &self,
        stream: Box<dyn Read + Send>,
    ) -> Result<()> {
        // Serialize against in-flight persists. The caller already
        // guarantees no concurrent apply.
        let _guard = self.snapshot_lock.lock();

        let new_engine = install::<E>(stream, &self.config.storage)?;

        // Atomically replace the current engine
        let displaced = self.engine.swap(Arc::new(new_engine));
        info!("state machine restored from snapshot archive");

        // The log position is owned by the consensus engine after a restore.
        self.last_applied_index.store(0, Ordering::SeqCst);
        self.last_applied_term.store(0, Ordering::SeqCst);

        if self.config.storage.cleanup == CleanupPolicy::Remove {
            let dir = displaced.dir().to_path_buf();
            drop(displaced);
            if let Err(e) = fs::remove_dir_all(&dir) {
                warn!("Failed to remove displaced engine dir {:?}: {}", dir, e);
            }
        }

        Ok(())
    }

    fn last_applied(&self) -> (u64, u64) {
        (
            self.last_applied_index.load(Ordering::SeqCst),
            self.last_applied_term.load(Ordering::SeqCst),
        )
    }
}
