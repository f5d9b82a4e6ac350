//! # Adapters
//!
//! - `storage`: `KeyValueStore` implementations
//! - `infra`: time sources
//! - `api_handler`: JSON responses for the HTTP layer (feature `api`)

#[cfg(feature = "api")]
pub mod api_handler;
pub mod infra;
pub mod storage;

pub use infra::{ManualTimeSource, SystemTimeSource};
pub use storage::InMemoryStore;
