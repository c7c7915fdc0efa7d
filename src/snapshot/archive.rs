//! Streams a directory tree to and from a gzip-compressed tar archive.
//!
//! File names and byte contents round-trip exactly; permission bits and
//! timestamps carry no meaning for snapshots.

use std::io::Read;
use std::io::Write;
use std::path::Path;

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;

use crate::Result;
use crate::SnapshotError;

/// Serialize the directory tree rooted at `src_dir` into `writer`.
///
/// Written incrementally; the archive is never buffered whole in memory. The
/// writer is handed back after the gzip trailer has been flushed.
pub fn pack<W: Write>(
    src_dir: &Path,
    writer: W,
) -> Result<W> {
    let encoder = GzEncoder::new(writer, Compression::default());
    let mut builder = tar::Builder::new(encoder);

    builder.append_dir_all(".", src_dir).map_err(|e| {
        SnapshotError::OperationFailed(format!("Failed to build tar archive: {e}"))
    })?;

    // Finish the tar stream, then the gzip stream, in that order.
    let encoder = builder.into_inner().map_err(|e| {
        SnapshotError::OperationFailed(format!("Failed to finish tar archive: {e}"))
    })?;
    let writer = encoder.finish().map_err(|e| {
        SnapshotError::OperationFailed(format!("Failed to finish gzip stream: {e}"))
    })?;

    Ok(writer)
}

/// Unpack an archive produced by [`pack`] into `dest_dir`, preserving
/// relative paths and byte-exact contents.
pub fn unpack<R: Read>(
    reader: R,
    dest_dir: &Path,
) -> Result<()> {
    let decoder = GzDecoder::new(reader);
    let mut archive = tar::Archive::new(decoder);

    archive.unpack(dest_dir).map_err(|e| {
        SnapshotError::InvalidFormat(format!("Failed to unpack snapshot archive: {e}"))
    })?;

    Ok(())
}
