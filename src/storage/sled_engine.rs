//! Sled-backed implementation of the storage engine contract.
//!
//! It works as KV storage for client business CRUDs. The key-value namespace
//! lives in a dedicated tree so engine-internal metadata never leaks into
//! snapshots of the logical data set.

use std::path::Path;
use std::path::PathBuf;

use tracing::error;

use crate::constants::KV_TREE;
use crate::storage::EngineView;
use crate::storage::StorageEngine;
use crate::Result;
use crate::StorageError;

pub struct SledStorageEngine {
    db: sled::Db,
    tree: sled::Tree,
    dir: PathBuf,
}

impl std::fmt::Debug for SledStorageEngine {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("SledStorageEngine")
            .field("dir", &self.dir)
            .field("tree_len", &self.tree.len())
            .finish()
    }
}

impl StorageEngine for SledStorageEngine {
    fn open(dir: &Path) -> Result<Self> {
        let db = sled::open(dir).map_err(|e| {
            error!("failed to open sled engine at {:?}: {}", dir, e);
            StorageError::DbError(e.to_string())
        })?;
        let tree = db.open_tree(KV_TREE)?;

        Ok(SledStorageEngine {
            db,
            tree,
            dir: dir.to_path_buf(),
        })
    }

    fn put(
        &self,
        key: &[u8],
        value: &[u8],
    ) -> Result<()> {
        self.tree.insert(key, value).map_err(|e| {
            error!("storage_engine put error: {}", e);
            StorageError::DbError(e.to_string())
        })?;
        Ok(())
    }

    fn get(
        &self,
        key: &[u8],
    ) -> Result<Option<Vec<u8>>> {
        match self.tree.get(key) {
            Ok(Some(v)) => Ok(Some(v.to_vec())),
            Ok(None) => Ok(None),
            Err(e) => {
                error!("storage_engine get error: {}", e);
                Err(StorageError::DbError(e.to_string()).into())
            }
        }
    }

    fn view(&self) -> Result<EngineView> {
        // Materialized up front: sled's iterator is live, so collecting here
        // pins the view to this instant instead of to iteration time.
        let pairs = self
            .tree
            .iter()
            .map(|item| item.map(|(k, v)| (k.to_vec(), v.to_vec())))
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| {
                error!("storage_engine view error: {}", e);
                StorageError::DbError(e.to_string())
            })?;
        Ok(Box::new(pairs.into_iter().map(Ok)))
    }

    fn flush(&self) -> Result<()> {
        self.db.flush()?;
        Ok(())
    }

    fn dir(&self) -> &Path {
        &self.dir
    }
}

impl SledStorageEngine {
    /// NOTE: This method may degrade system performance. Use with caution.
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
