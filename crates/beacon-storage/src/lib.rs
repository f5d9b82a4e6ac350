//! # Beacon Storage
//!
//! The persistence core of the beacon backend. Beacons (geotagged image
//! posts), their comments, user accounts and heart/flag votes are mapped
//! onto the primitives of a schema-less key-value store: counters, hashes,
//! lists, sets and a geospatial index.
//!
//! ## Key Layout
//!
//! ```text
//! post-count, user-count          ID counters (posts and comments share one)
//! p:<id>                          post hash (beacon or comment, `type` field)
//! p:<id>:c                        beacon -> comment IDs, insertion order
//! hearted-by:<id>, flagged-by:<id>
//!                                 users who hearted / flagged a post
//! u:<id>                          user hash
//! usernames                       set of taken usernames
//! emails                          email -> user ID hash
//! beacon-locs                     geo index of beacon coordinates
//! ```
//!
//! ## Domain Invariants
//!
//! | Invariant | Description |
//! |-----------|-------------|
//! | Unique IDs | Counters only grow; posts and comments never share an ID |
//! | Vote Mirror | A post's heart/flag counter equals the size of its vote set |
//! | One Vote | A user hearts (or flags) a post at most once |
//! | Unique Names | No two users share a username or an email |
//! | Ordered Threads | Comments come back in the order they were added |
//! | Referential Integrity | A listed comment's parent is the listing beacon |
//!
//! ## Crate Structure (Hexagonal Architecture)
//!
//! - `domain/` - Codec, key schema, geo math, secrets, config and errors
//! - `ports/` - Port traits (inbound API, outbound store and clock)
//! - `adapters/` - In-memory store, time sources, JSON API handler
//! - `service/` - Application service implementing the API
//!
//! ## Usage
//!
//! ```ignore
//! use beacon_storage::{BeaconStorageApi, BeaconStorageService, StorageConfig};
//!
//! let service = BeaconStorageService::new_in_memory(StorageConfig::test())?;
//! let id = service.add_beacon(new_beacon)?;
//! service.heart(id, user_id)?;
//! let thread = service.get_thread(id)?;
//! ```

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

// Re-export key types for convenience
pub use adapters::{InMemoryStore, ManualTimeSource, SystemTimeSource};
pub use domain::codec::{DecodeError, EntityCodec, IntCodec};
pub use domain::errors::{KVStoreError, StorageError};
pub use domain::keys::KeySchema;
pub use domain::types::{ConfigError, EntityKind, StorageConfig, StorageMode, VoteKind};
pub use ports::inbound::BeaconStorageApi;
pub use ports::outbound::{KeyValueStore, TimeSource};
pub use service::{BeaconStorageDependencies, BeaconStorageService};

#[cfg(feature = "api")]
pub use adapters::api_handler::{ApiResponse, BeaconApiHandler, Credentials, ErrorCode};
