use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;

use crate::constants::DEFAULT_SCRATCH_PREFIX;
use crate::Error;
use crate::Result;

/// Scratch-space configuration for the state machine's storage lifecycle.
///
/// Every engine instance this crate opens, whether the startup engine, a
/// snapshot staging copy or an unpacked archive, lives in its own uniquely
/// named subdirectory of `scratch_root`.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct StorageConfig {
    /// Root directory for scratch engine directories
    /// Must be on a filesystem with enough space for two full copies of the
    /// key-value data (live engine plus snapshot staging)
    #[serde(default = "default_scratch_root")]
    pub scratch_root: PathBuf,

    /// Name prefix for scratch directories
    /// Default value is set via default_scratch_prefix() function
    #[serde(default = "default_scratch_prefix")]
    pub scratch_prefix: String,

    /// What happens to the displaced engine directory after a successful
    /// restore swap
    #[serde(default)]
    pub cleanup: CleanupPolicy,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            scratch_root: default_scratch_root(),
            scratch_prefix: default_scratch_prefix(),
            cleanup: CleanupPolicy::default(),
        }
    }
}

impl StorageConfig {
    /// Validates scratch-space settings
    pub fn validate(&self) -> Result<()> {
        if self.scratch_root.as_os_str().is_empty() {
            return Err(Error::Config("scratch_root must not be empty".into()));
        }

        if self.scratch_prefix.is_empty() {
            return Err(Error::Config("scratch_prefix must not be empty".into()));
        }

        Ok(())
    }
}

/// Cleanup policy for the engine directory displaced by a restore.
///
/// The swap itself never deletes anything synchronously; `Remove` deletes the
/// displaced directory only after the new engine is active.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum CleanupPolicy {
    /// Leave the displaced directory on disk for external cleanup
    #[default]
    Retain,

    /// Remove the displaced directory once the swap has completed
    Remove,
}

fn default_scratch_root() -> PathBuf {
    PathBuf::from("/tmp/raftkv-fsm")
}

fn default_scratch_prefix() -> String {
    DEFAULT_SCRATCH_PREFIX.to_string()
}
