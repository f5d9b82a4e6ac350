//! # Outbound Ports (Driven Ports)
//!
//! Dependencies required by the beacon storage service.
//!
//! The store is modeled as a crash-safe keyed table server: every method is
//! one request/response round trip and is atomic on its own. Nothing here
//! spans more than one command.

use crate::domain::codec::FieldMap;
use crate::domain::errors::KVStoreError;
use beacon_types::{Geotag, Timestamp};
use std::time::Duration;

/// Abstract interface for the keyed store.
///
/// Production: a table server reached over its wire protocol.
/// Testing: `InMemoryStore` (adapters/storage/memory.rs).
///
/// Keys that have expired behave exactly like keys that never existed.
pub trait KeyValueStore: Send + Sync {
    // =========================================================================
    // COUNTERS
    // =========================================================================

    /// Atomically increment a counter key, creating it at 0 first.
    /// Returns the new value.
    fn incr(&self, key: &str) -> Result<i64, KVStoreError>;

    /// Read a plain value.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, KVStoreError>;

    // =========================================================================
    // HASHES
    // =========================================================================

    /// Write several fields of a hash in one command.
    fn hset_multiple(&self, key: &str, fields: &[(&str, Vec<u8>)]) -> Result<(), KVStoreError>;

    fn hset(&self, key: &str, field: &str, value: &[u8]) -> Result<(), KVStoreError>;

    /// Write a field only if it is absent. Returns whether it was written.
    fn hset_nx(&self, key: &str, field: &str, value: &[u8]) -> Result<bool, KVStoreError>;

    fn hget(&self, key: &str, field: &str) -> Result<Option<Vec<u8>>, KVStoreError>;

    /// All fields of a hash; empty if the key does not exist.
    fn hget_all(&self, key: &str) -> Result<FieldMap, KVStoreError>;

    /// Remove a field; the hash disappears with its last field.
    /// Returns whether the field existed.
    fn hdel(&self, key: &str, field: &str) -> Result<bool, KVStoreError>;

    /// Atomically add `delta` to a decimal integer field, creating it at 0.
    /// Returns the new value.
    fn hincr_by(&self, key: &str, field: &str, delta: i64) -> Result<i64, KVStoreError>;

    // =========================================================================
    // LISTS
    // =========================================================================

    /// Push to the tail. Returns the new length.
    fn rpush(&self, key: &str, value: &[u8]) -> Result<usize, KVStoreError>;

    /// Inclusive range; negative indices count from the tail (`-1` is last).
    fn lrange(&self, key: &str, start: i64, stop: i64) -> Result<Vec<Vec<u8>>, KVStoreError>;

    fn llen(&self, key: &str) -> Result<usize, KVStoreError>;

    // =========================================================================
    // SETS
    // =========================================================================

    /// Returns `true` if the member was added (was not present).
    fn sadd(&self, key: &str, member: &str) -> Result<bool, KVStoreError>;

    /// Returns `true` if the member was removed (was present).
    fn srem(&self, key: &str, member: &str) -> Result<bool, KVStoreError>;

    fn sismember(&self, key: &str, member: &str) -> Result<bool, KVStoreError>;

    fn scard(&self, key: &str) -> Result<usize, KVStoreError>;

    // =========================================================================
    // GEOSPATIAL
    // =========================================================================

    /// Add or move a member.
    fn geo_add(&self, key: &str, member: &str, location: Geotag) -> Result<(), KVStoreError>;

    fn geo_remove(&self, key: &str, member: &str) -> Result<bool, KVStoreError>;

    /// Members within `radius_km` of `center`, in the store's own order.
    fn geo_radius(
        &self,
        key: &str,
        center: &Geotag,
        radius_km: f64,
    ) -> Result<Vec<String>, KVStoreError>;

    // =========================================================================
    // KEYS / ADMIN
    // =========================================================================

    fn exists(&self, key: &str) -> Result<bool, KVStoreError>;

    /// Set a time-to-live. Returns `false` if the key does not exist.
    fn expire(&self, key: &str, ttl: Duration) -> Result<bool, KVStoreError>;

    /// Switch this handle to another isolated namespace.
    fn select(&self, namespace: u32) -> Result<(), KVStoreError>;

    /// Delete every key in the currently selected namespace.
    fn flush_namespace(&self) -> Result<(), KVStoreError>;
}

/// Abstract interface for time operations (for testability).
pub trait TimeSource: Send + Sync {
    /// Get current timestamp in seconds since epoch.
    fn now(&self) -> Timestamp;
}
