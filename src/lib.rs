mod config;
mod constants;
mod errors;
mod proto;
mod snapshot;
mod state_machine;
mod storage;
pub mod utils;

pub use config::*;
pub use errors::*;
pub use proto::*;
pub use snapshot::*;
pub use state_machine::*;
pub use storage::*;

//-----------------------------------------------------------
// Test utils

#[cfg(test)]
pub mod test_utils;
