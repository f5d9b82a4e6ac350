//! # Beacon Test Suite
//!
//! Unified test crate containing:
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── benchmarks/       # Criterion benchmarks over the storage facade
//! ├── exploits/         # Concurrent abuse of the multi-command sequences
//! └── integration/      # End-to-end scenarios across the facade
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p beacon-tests
//!
//! # By category
//! cargo test -p beacon-tests integration::
//! cargo test -p beacon-tests exploits::
//!
//! # With storage logs
//! RUST_LOG=debug cargo test -p beacon-tests -- --nocapture
//!
//! # Benchmarks
//! cargo bench -p beacon-tests
//! ```

#![allow(dead_code)]

pub mod benchmarks;
pub mod exploits;
pub mod integration;

/// Route `tracing` output to the test harness, filtered by `RUST_LOG`.
///
/// Safe to call from every test; only the first call installs.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
