//! Wire types exchanged with the consensus engine.
//!
//! Messages are hand-derived `prost` structs; no code generation step. The
//! command encoding is forward compatible: an unrecognized [`Action`]
//! discriminant still decodes successfully and is rejected at apply time,
//! never at decode time.

/// A committed log entry delivered by the consensus engine.
///
/// Ordering and deduplication of delivery are the consensus engine's
/// responsibility; this crate applies entries exactly as handed over.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Entry {
    #[prost(uint64, tag = "1")]
    pub index: u64,

    #[prost(uint64, tag = "2")]
    pub term: u64,

    /// Opaque command payload, decoded as a [`WriteCommand`]
    #[prost(bytes = "vec", tag = "3")]
    pub payload: Vec<u8>,
}

/// A client write command carried inside an entry payload.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct WriteCommand {
    /// Raw action discriminant; see [`Action`]. Kept as `i32` so unknown
    /// values survive decoding.
    #[prost(enumeration = "Action", tag = "1")]
    pub action: i32,

    #[prost(bytes = "vec", tag = "2")]
    pub key: Vec<u8>,

    #[prost(bytes = "vec", tag = "3")]
    pub value: Vec<u8>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum Action {
    /// Reserved; never applied
    Unspecified = 0,

    /// Put `key`/`value` into the active storage engine
    Write = 1,
}
