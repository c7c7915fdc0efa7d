//! Shared helpers for unit tests.

use std::io::Write;
use std::path::Path;

use prost::Message;

use crate::config::FsmConfig;
use crate::config::StorageConfig;
use crate::proto::Action;
use crate::proto::Entry;
use crate::proto::WriteCommand;
use crate::state_machine::KvStateMachine;
use crate::state_machine::SnapshotSink;
use crate::storage::SledStorageEngine;

static LOGGER_INIT: once_cell::sync::Lazy<()> = once_cell::sync::Lazy::new(|| {
    env_logger::init();
});

pub fn enable_logger() {
    *LOGGER_INIT;
}

/// Config rooted in a test-owned directory.
pub fn test_config(scratch_root: &Path) -> FsmConfig {
    FsmConfig {
        storage: StorageConfig {
            scratch_root: scratch_root.to_path_buf(),
            ..StorageConfig::default()
        },
    }
}

/// Sled-backed state machine rooted in a test-owned directory.
pub fn setup_state_machine(scratch_root: &Path) -> KvStateMachine<SledStorageEngine> {
    KvStateMachine::new(test_config(scratch_root)).expect("state machine should open")
}

/// Entry carrying a WRITE command.
pub fn write_entry(
    index: u64,
    term: u64,
    key: &[u8],
    value: &[u8],
) -> Entry {
    Entry {
        index,
        term,
        payload: encode_command(Action::Write as i32, key, value),
    }
}

/// Encoded command with an arbitrary raw action discriminant.
pub fn encode_command(
    action: i32,
    key: &[u8],
    value: &[u8],
) -> Vec<u8> {
    WriteCommand {
        action,
        key: key.to_vec(),
        value: value.to_vec(),
    }
    .encode_to_vec()
}

/// Number of entries directly under `root`; scratch-leak assertions count
/// engine homes this way.
pub fn dir_count(root: &Path) -> usize {
    std::fs::read_dir(root).map(|rd| rd.count()).unwrap_or(0)
}

/// In-memory sink recording completion and cancellation.
#[derive(Default)]
pub struct MemorySink {
    pub buf: Vec<u8>,
    pub completed: bool,
    pub cancelled: bool,
}

impl Write for MemorySink {
    fn write(
        &mut self,
        buf: &[u8],
    ) -> std::io::Result<usize> {
        self.buf.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl SnapshotSink for MemorySink {
    fn cancel(&mut self) -> std::io::Result<()> {
        self.cancelled = true;
        self.buf.clear();
        Ok(())
    }

    fn complete(&mut self) -> std::io::Result<()> {
        self.completed = true;
        Ok(())
    }
}

/// Sink that starts failing after `limit` accepted bytes.
pub struct FailingSink {
    pub limit: usize,
    pub written: usize,
    pub cancelled: bool,
}

impl FailingSink {
    pub fn new(limit: usize) -> Self {
        FailingSink {
            limit,
            written: 0,
            cancelled: false,
        }
    }
}

impl Write for FailingSink {
    fn write(
        &mut self,
        buf: &[u8],
    ) -> std::io::Result<usize> {
        if self.written + buf.len() > self.limit {
            return Err(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "sink refused write",
            ));
        }
        self.written += buf.len();
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl SnapshotSink for FailingSink {
    fn cancel(&mut self) -> std::io::Result<()> {
        self.cancelled = true;
        Ok(())
    }

    fn complete(&mut self) -> std::io::Result<()> {
        panic!("complete called on a sink that failed");
    }
}
