//! Key-value storage for Pulse.
//!
//! The local-storage analogue: a string-keyed store trait, in-memory and
//! file-backed implementations, and typed JSON snapshots on top.

pub mod file;
pub mod memory;
pub mod snapshot;
pub mod traits;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use snapshot::{load_lenient, update_json, Snapshot};
pub use traits::KeyValueStore;
