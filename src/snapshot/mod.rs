//! Snapshot production and installation.
//!
//! A snapshot is a gzip-compressed tar archive of a complete storage engine
//! directory tree: self-contained, and openable as an independent engine once
//! unpacked. The same codec produces and consumes the format.

pub mod archive;

mod installer;
mod producer;

#[cfg(test)]
mod producer_test;

pub use installer::*;
pub use producer::*;
