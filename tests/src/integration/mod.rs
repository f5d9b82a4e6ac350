//! # Integration Tests
//!
//! Scenarios driven through `BeaconStorageApi` only, the way the HTTP
//! layer uses it.

pub mod flows;
pub mod geo_radius;
