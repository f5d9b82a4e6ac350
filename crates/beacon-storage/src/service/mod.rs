//! # Beacon Storage Service
//!
//! The storage facade: maps beacons, comments, users and votes onto the
//! store's primitives and enforces the invariants the store cannot.
//!
//! ## Architecture
//!
//! This service:
//! 1. Implements `BeaconStorageApi` (storage.rs)
//! 2. Allocates IDs from shared counters (ids.rs)
//! 3. Writes and reads post records (posts.rs)
//! 4. Maintains beacon -> comment lists and assembles threads (relations.rs)
//! 5. Guards votes with per-post membership sets (votes.rs)
//! 6. Maintains the geospatial beacon index (geo_index.rs)
//! 7. Manages users, uniqueness and secrets (users.rs)
//! 8. Seeds fixture data in Development mode (fixtures.rs)
//!
//! The store handle is injected; there is no process-wide client.

pub mod fixtures;
mod geo_index;
mod ids;
mod posts;
mod relations;
mod storage;
mod users;
mod votes;

use crate::adapters::infra::SystemTimeSource;
use crate::adapters::storage::InMemoryStore;
use crate::domain::codec::EntityCodec;
use crate::domain::errors::StorageError;
use crate::domain::keys::KeySchema;
use crate::domain::types::{StorageConfig, StorageMode, VoteKind};
use crate::ports::outbound::{KeyValueStore, TimeSource};
use beacon_types::{PostId, Timestamp};
use std::sync::Arc;

/// The beacon storage service (the `DBClient` of the HTTP layer).
///
/// `Send + Sync` whenever its dependencies are; share it behind an `Arc`.
pub struct BeaconStorageService<KV, TS>
where
    KV: KeyValueStore,
    TS: TimeSource,
{
    /// Keyed store handle.
    pub(crate) store: Arc<KV>,
    /// Time source for creation timestamps.
    pub(crate) time_source: TS,
    /// Field codec, fixed to the configured ID radix.
    pub(crate) codec: EntityCodec,
    /// Service configuration.
    pub(crate) config: StorageConfig,
}

/// Dependencies for BeaconStorageService
pub struct BeaconStorageDependencies<KV, TS> {
    pub store: Arc<KV>,
    pub time_source: TS,
}

impl<KV, TS> BeaconStorageService<KV, TS>
where
    KV: KeyValueStore,
    TS: TimeSource,
{
    /// Create a new service with the given dependencies.
    ///
    /// On construction, this will:
    /// 1. Validate the configuration
    /// 2. Select the namespace of the configured mode
    /// 3. Development: flush it and (optionally) seed fixtures
    /// 4. Test: flush it
    pub fn new(
        deps: BeaconStorageDependencies<KV, TS>,
        config: StorageConfig,
    ) -> Result<Self, StorageError> {
        config.validate()?;

        let service = Self {
            store: deps.store,
            time_source: deps.time_source,
            codec: EntityCodec::new(config.int_radix),
            config,
        };

        let namespace = service.config.active_namespace();
        service.store.select(namespace)?;

        #[cfg(feature = "tracing-log")]
        tracing::info!(
            "[beacon-storage] {:?} mode, namespace {}",
            service.config.mode,
            namespace
        );

        match service.config.mode {
            StorageMode::Production => {}
            StorageMode::Development => {
                service.store.flush_namespace()?;
                if service.config.seed_fixtures {
                    service.seed_fixtures()?;
                }
            }
            StorageMode::Test => service.store.flush_namespace()?,
        }

        Ok(service)
    }

    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<KV> {
        &self.store
    }

    pub(crate) fn now(&self) -> Timestamp {
        self.time_source.now()
    }

    /// Apply the configured record lifetime to `key`, if any.
    /// Returns `false` only when a lifetime applies and `key` is gone.
    pub(crate) fn touch(&self, key: &str) -> Result<bool, StorageError> {
        match self.config.post_ttl {
            Some(ttl) => Ok(self.store.expire(key, ttl)?),
            None => Ok(true),
        }
    }

    /// Refresh a post record together with its vote sets, so a counter
    /// never outlives the set it mirrors. Returns whether the post exists.
    pub(crate) fn touch_post(&self, id: PostId) -> Result<bool, StorageError> {
        if !self.records_expire() {
            return self.post_exists(id);
        }
        if !self.touch(&KeySchema::post(id))? {
            return Ok(false);
        }
        for kind in [VoteKind::Heart, VoteKind::Flag] {
            self.touch(&KeySchema::vote_set(kind, id))?;
        }
        Ok(true)
    }

    /// Whether records may legitimately disappear.
    pub(crate) fn records_expire(&self) -> bool {
        self.config.post_ttl.is_some()
    }
}

impl BeaconStorageService<InMemoryStore, SystemTimeSource> {
    /// Service over a fresh in-memory store and the system clock.
    pub fn new_in_memory(config: StorageConfig) -> Result<Self, StorageError> {
        let deps = BeaconStorageDependencies {
            store: Arc::new(InMemoryStore::new()),
            time_source: SystemTimeSource,
        };
        Self::new(deps, config)
    }
}
