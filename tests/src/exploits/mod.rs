//! # Exploit Simulations
//!
//! Attacks on the multi-command sequences of the storage core. Each vote
//! and each account claim spans several store commands with no store-level
//! transaction; these tests fire identical requests from many threads and
//! check that the store's single-command atomicity still decides a single
//! winner.

pub mod races;
