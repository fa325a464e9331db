//! Persistence Adapters - JSON Record Storage
//!
//! Implements the `StateRepository` port with atomic per-record JSON
//! files, plus a volatile in-memory variant.

pub mod memory;
pub mod state;

pub use memory::MemoryStore;
pub use state::JsonFileStore;
