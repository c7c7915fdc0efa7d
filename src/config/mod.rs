//! Configuration for the state machine core.
//!
//! This crate only defines the deserializable shape and its validation; the
//! surrounding service owns loading (files, environment, CLI) and hands the
//! finished struct to [`crate::KvStateMachine::new`].

mod storage;
pub use storage::*;


use serde::Deserialize;
use serde::Serialize;

use crate::Result;

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct FsmConfig {
    /// Scratch space and cleanup behavior for snapshot generation and restore
    #[serde(default)]
    pub storage: StorageConfig,
}

impl FsmConfig {
    /// Validates all subsystem configurations
    pub fn validate(&self) -> Result<()> {
        self.storage.validate()
    }
}
