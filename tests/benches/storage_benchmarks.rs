//! # Beacon Storage Benchmarks
//!
//! | Operation | Store commands |
//! |-----------|----------------|
//! | add_beacon | incr + hash write + geo insert |
//! | get_thread | 1 + list range + N comment reads |
//! | beacons_within | geo scan + N beacon reads |
//! | heart / unheart | existence + set op + counter |

use beacon_tests::benchmarks::register_benchmarks;
use criterion::{criterion_group, criterion_main};

criterion_group!(benches, register_benchmarks);
criterion_main!(benches);
