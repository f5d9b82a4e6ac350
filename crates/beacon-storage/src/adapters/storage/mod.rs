//! Storage Adapters
//!
//! Implementations of `KeyValueStore`.

mod memory;

pub use memory::InMemoryStore;
