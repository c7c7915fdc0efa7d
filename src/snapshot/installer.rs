//! Turns an archive stream back into a live storage engine instance.

use std::io::Read;

use tracing::debug;
use tracing::error;

use crate::config::StorageConfig;
use crate::constants::GZIP_MAGIC;
use crate::snapshot::archive;
use crate::storage::StorageEngine;
use crate::utils::ScratchDir;
use crate::Result;
use crate::SnapshotError;

/// Unpack a single-pass archive stream into a fresh scratch directory and
/// open an engine there.
///
/// Any failure at decompress/unpack/open aborts the whole operation: no
/// engine is returned and the partially written scratch directory is
/// discarded. On success the directory is kept; it is the new engine's home.
pub fn install<E: StorageEngine>(
    mut stream: Box<dyn Read + Send>,
    config: &StorageConfig,
) -> Result<E> {
    // Validate the gzip magic before touching the disk.
    let mut magic = [0u8; 2];
    stream.read_exact(&mut magic).map_err(|e| {
        SnapshotError::InvalidFormat(format!("Truncated snapshot stream: {e}"))
    })?;
    if magic != GZIP_MAGIC {
        error!("snapshot stream is not gzip compressed: magic {:02x?}", magic);
        return Err(SnapshotError::InvalidFormat(
            "Snapshot stream is not gzip compressed".to_string(),
        )
        .into());
    }

    let scratch = ScratchDir::create(&config.scratch_root, &config.scratch_prefix)?;

    let stream = std::io::Cursor::new(magic).chain(stream);
    archive::unpack(stream, scratch.path())?;

    let engine = E::open(scratch.path())?;
    let dir = scratch.into_path();
    debug!("snapshot installed at {:?}", dir);

    Ok(engine)
}
