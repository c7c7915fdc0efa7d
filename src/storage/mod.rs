mod sled_engine;
mod storage_engine;


pub use sled_engine::*;
pub use storage_engine::*;
