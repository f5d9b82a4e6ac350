//! # Beacon Benchmarks
//!
//! Criterion benchmarks over the storage facade, registered from
//! `benches/storage_benchmarks.rs`.

pub mod beacon_storage;

pub use beacon_storage::register_benchmarks;
