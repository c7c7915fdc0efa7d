// -
// Database namespaces

/// Sled tree holding the replicated key-value namespace.
pub(crate) const KV_TREE: &str = "kv_state_machine";

// -
// Snapshot scratch space

/// Default name prefix for scratch directories created under the configured
/// scratch root.
pub(crate) const DEFAULT_SCRATCH_PREFIX: &str = "state";

/// Magic bytes opening every gzip stream; checked before a restore touches
/// the disk.
pub(crate) const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];
