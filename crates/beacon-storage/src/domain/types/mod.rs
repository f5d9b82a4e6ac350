//! # Types Module
//!
//! Configuration and small value types.

mod config;
mod kinds;

pub use config::{ConfigError, StorageConfig, StorageMode};
pub use kinds::{EntityKind, VoteKind};
