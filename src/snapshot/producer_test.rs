use std::sync::Arc;

use parking_lot::Mutex;

use super::*;
use crate::snapshot::archive;
use crate::state_machine::Persistable;
use crate::storage::SledStorageEngine;
use crate::storage::StorageEngine;
use crate::test_utils::dir_count;
use crate::test_utils::enable_logger;
use crate::test_utils::FailingSink;
use crate::test_utils::MemorySink;
use crate::test_utils::test_config;
use crate::Error;
use crate::SnapshotError;

fn snapshot_of(
    engine: &SledStorageEngine,
    scratch_root: &std::path::Path,
) -> KvSnapshot<SledStorageEngine> {
    KvSnapshot::new(
        engine.view().expect("should succeed"),
        test_config(scratch_root).storage,
        Arc::new(Mutex::new(())),
    )
}

#[test]
fn test_persist_produces_self_contained_archive() {
    enable_logger();
    let engine_dir = tempfile::tempdir().expect("should succeed");
    let scratch_root = tempfile::tempdir().expect("should succeed");

    let engine = SledStorageEngine::open(engine_dir.path()).expect("should succeed");
    engine.put(b"k1", b"v1").expect("should succeed");
    engine.put(b"k2", b"v2").expect("should succeed");

    let mut snapshot = snapshot_of(&engine, scratch_root.path());
    let mut sink = MemorySink::default();
    snapshot.persist(&mut sink).expect("should succeed");
    snapshot.release();

    assert!(sink.completed);
    assert!(!sink.cancelled);

    // The archive opens as an independent engine.
    let unpack_dir = tempfile::tempdir().expect("should succeed");
    archive::unpack(&sink.buf[..], unpack_dir.path()).expect("should succeed");
    let restored = SledStorageEngine::open(unpack_dir.path()).expect("should succeed");
    assert_eq!(restored.get(b"k1").expect("should succeed"), Some(b"v1".to_vec()));
    assert_eq!(restored.get(b"k2").expect("should succeed"), Some(b"v2".to_vec()));
}

#[test]
fn test_persist_cleans_scratch_on_success() {
    enable_logger();
    let engine_dir = tempfile::tempdir().expect("should succeed");
    let scratch_root = tempfile::tempdir().expect("should succeed");

    let engine = SledStorageEngine::open(engine_dir.path()).expect("should succeed");
    engine.put(b"k", b"v").expect("should succeed");

    let mut snapshot = snapshot_of(&engine, scratch_root.path());
    let mut sink = MemorySink::default();
    snapshot.persist(&mut sink).expect("should succeed");
    snapshot.release();

    assert_eq!(dir_count(scratch_root.path()), 0);
}

#[test]
fn test_sink_failure_cancels_and_cleans() {
    enable_logger();
    let engine_dir = tempfile::tempdir().expect("should succeed");
    let scratch_root = tempfile::tempdir().expect("should succeed");

    let engine = SledStorageEngine::open(engine_dir.path()).expect("should succeed");
    engine.put(b"k", b"v").expect("should succeed");

    let mut snapshot = snapshot_of(&engine, scratch_root.path());
    let mut sink = FailingSink::new(16);
    let result = snapshot.persist(&mut sink);
    snapshot.release();

    assert!(matches!(
        result,
        Err(Error::Snapshot(SnapshotError::OperationFailed(_)))
    ));
    assert!(sink.cancelled);
    assert_eq!(dir_count(scratch_root.path()), 0);
}

#[test]
fn test_persist_twice_fails() {
    enable_logger();
    let engine_dir = tempfile::tempdir().expect("should succeed");
    let scratch_root = tempfile::tempdir().expect("should succeed");

    let engine = SledStorageEngine::open(engine_dir.path()).expect("should succeed");
    engine.put(b"k", b"v").expect("should succeed");

    let mut snapshot = snapshot_of(&engine, scratch_root.path());
    let mut sink = MemorySink::default();
    snapshot.persist(&mut sink).expect("should succeed");

    let mut second_sink = MemorySink::default();
    assert!(matches!(
        snapshot.persist(&mut second_sink),
        Err(Error::Snapshot(SnapshotError::AlreadyConsumed))
    ));
}

#[test]
fn test_persist_after_release_fails() {
    enable_logger();
    let engine_dir = tempfile::tempdir().expect("should succeed");
    let scratch_root = tempfile::tempdir().expect("should succeed");

    let engine = SledStorageEngine::open(engine_dir.path()).expect("should succeed");

    let mut snapshot = snapshot_of(&engine, scratch_root.path());
    snapshot.release();

    let mut sink = MemorySink::default();
    assert!(matches!(
        snapshot.persist(&mut sink),
        Err(Error::Snapshot(SnapshotError::AlreadyConsumed))
    ));
    assert!(!sink.cancelled);
}
