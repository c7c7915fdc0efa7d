//! Filesystem helpers shared by the storage and snapshot layers.


use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::path::PathBuf;

use nanoid::nanoid;
use tracing::warn;

use crate::Result;
use crate::StorageError;

/// A uniquely named scratch directory, removed when the guard drops.
///
/// Used for snapshot staging and archive unpacking. Call
/// [`ScratchDir::into_path`] when the directory must outlive the guard; a
/// restored engine keeps its scratch directory as its permanent home.
#[derive(Debug)]
pub struct ScratchDir {
    path: PathBuf,
    keep: bool,
}

impl ScratchDir {
    /// Create a fresh directory under `root` named `<prefix>-<unique id>`.
    pub fn create(
        root: &Path,
        prefix: &str,
    ) -> Result<Self> {
        let path = root.join(format!("{}-{}", prefix, nanoid!()));
        fs::create_dir_all(&path).map_err(|e| StorageError::PathError {
            path: path.clone(),
            source: e,
        })?;
        Ok(ScratchDir { path, keep: false })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Detach the directory from the guard; it will not be removed on drop.
    pub fn into_path(mut self) -> PathBuf {
        self.keep = true;
        self.path.clone()
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        if self.keep {
            return;
        }
        if let Err(e) = fs::remove_dir_all(&self.path) {
            if e.kind() != ErrorKind::NotFound {
                warn!("Failed to remove scratch directory {:?}: {}", self.path, e);
            }
        }
    }
}
