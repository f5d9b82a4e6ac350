//! Builders shared by unit tests and the workspace test crate.

use crate::adapters::infra::ManualTimeSource;
use crate::adapters::storage::InMemoryStore;
use crate::domain::codec::FieldMap;
use crate::domain::errors::KVStoreError;
use crate::domain::geo::EARTH_RADIUS_KM;
use crate::domain::types::StorageConfig;
use crate::ports::outbound::KeyValueStore;
use crate::service::{BeaconStorageDependencies, BeaconStorageService};
use beacon_types::{Geotag, NewBeacon, NewComment, PostId, Timestamp, UserId};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

pub type TestService = BeaconStorageService<InMemoryStore, ManualTimeSource>;

pub type FaultyService = BeaconStorageService<FaultyStore, ManualTimeSource>;

/// Clock start for test services (2015-12-08).
pub const TEST_EPOCH: Timestamp = 1_449_600_000;

pub const ORIGIN: Geotag = Geotag::new(33.2140, -87.5391);

/// Service whose store and clock share one manual time source.
///
/// Panics on an invalid `config`; tests pass valid ones.
pub fn make_test_service(config: StorageConfig) -> (TestService, ManualTimeSource) {
    let clock = ManualTimeSource::new(TEST_EPOCH);
    let deps = BeaconStorageDependencies {
        store: Arc::new(InMemoryStore::with_time_source(Arc::new(clock.clone()))),
        time_source: clock.clone(),
    };
    let service = match BeaconStorageService::new(deps, config) {
        Ok(service) => service,
        Err(e) => panic!("test service construction failed: {}", e),
    };
    (service, clock)
}

/// Like `make_test_service`, over a `FaultyStore`.
pub fn make_faulty_service(config: StorageConfig) -> (FaultyService, ManualTimeSource) {
    let clock = ManualTimeSource::new(TEST_EPOCH);
    let inner = InMemoryStore::with_time_source(Arc::new(clock.clone()));
    let deps = BeaconStorageDependencies {
        store: Arc::new(FaultyStore::new(inner)),
        time_source: clock.clone(),
    };
    let service = match BeaconStorageService::new(deps, config) {
        Ok(service) => service,
        Err(e) => panic!("test service construction failed: {}", e),
    };
    (service, clock)
}

pub fn make_new_beacon(poster_id: UserId, location: Geotag) -> NewBeacon {
    NewBeacon {
        image: vec![0xFF, 0xD8, 0xFF, 0xE0],
        thumbnail: vec![0xFF, 0xD8],
        location,
        poster_id,
        description: format!("beacon by user {}", poster_id),
    }
}

pub fn make_new_comment(beacon_id: PostId, poster_id: UserId, text: &str) -> NewComment {
    NewComment {
        beacon_id,
        poster_id,
        text: text.to_string(),
    }
}

/// The point `north_km` north and `east_km` east of `origin`, on a sphere.
pub fn offset_by_km(origin: Geotag, north_km: f64, east_km: f64) -> Geotag {
    let d_lat = (north_km / EARTH_RADIUS_KM).to_degrees();
    let d_lon = (east_km / (EARTH_RADIUS_KM * origin.latitude.to_radians().cos())).to_degrees();
    Geotag::new(origin.latitude + d_lat, origin.longitude + d_lon)
}

enum FaultAction {
    Fail,
    Run(Box<dyn FnOnce() + Send>),
}

struct Fault {
    command: &'static str,
    key_prefix: String,
    action: FaultAction,
}

/// `InMemoryStore` that can fail, or run a hook before, the next command
/// matching a name and key prefix. Every fault fires once.
pub struct FaultyStore {
    inner: InMemoryStore,
    faults: Mutex<Vec<Fault>>,
}

impl FaultyStore {
    pub fn new(inner: InMemoryStore) -> Self {
        Self {
            inner,
            faults: Mutex::new(Vec::new()),
        }
    }

    pub fn inner(&self) -> &InMemoryStore {
        &self.inner
    }

    /// Fail the next `command` on a key starting with `key_prefix`.
    pub fn fail_next(&self, command: &'static str, key_prefix: &str) {
        self.push(command, key_prefix, FaultAction::Fail);
    }

    /// Run `hook` just before the next matching command executes.
    pub fn before_next(
        &self,
        command: &'static str,
        key_prefix: &str,
        hook: impl FnOnce() + Send + 'static,
    ) {
        self.push(command, key_prefix, FaultAction::Run(Box::new(hook)));
    }

    fn push(&self, command: &'static str, key_prefix: &str, action: FaultAction) {
        self.faults.lock().push(Fault {
            command,
            key_prefix: key_prefix.to_string(),
            action,
        });
    }

    fn check(&self, command: &'static str, key: &str) -> Result<(), KVStoreError> {
        let fault = {
            let mut faults = self.faults.lock();
            faults
                .iter()
                .position(|f| f.command == command && key.starts_with(&f.key_prefix))
                .map(|i| faults.remove(i))
        };
        match fault.map(|f| f.action) {
            None => Ok(()),
            Some(FaultAction::Fail) => Err(KVStoreError::IOError {
                message: format!("{} {} failed", command, key),
            }),
            Some(FaultAction::Run(hook)) => {
                hook();
                Ok(())
            }
        }
    }
}

impl KeyValueStore for FaultyStore {
    fn incr(&self, key: &str) -> Result<i64, KVStoreError> {
        self.check("incr", key)?;
        self.inner.incr(key)
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, KVStoreError> {
        self.check("get", key)?;
        self.inner.get(key)
    }

    fn hset_multiple(&self, key: &str, fields: &[(&str, Vec<u8>)]) -> Result<(), KVStoreError> {
        self.check("hset_multiple", key)?;
        self.inner.hset_multiple(key, fields)
    }

    fn hset(&self, key: &str, field: &str, value: &[u8]) -> Result<(), KVStoreError> {
        self.check("hset", key)?;
        self.inner.hset(key, field, value)
    }

    fn hset_nx(&self, key: &str, field: &str, value: &[u8]) -> Result<bool, KVStoreError> {
        self.check("hset_nx", key)?;
        self.inner.hset_nx(key, field, value)
    }

    fn hget(&self, key: &str, field: &str) -> Result<Option<Vec<u8>>, KVStoreError> {
        self.check("hget", key)?;
        self.inner.hget(key, field)
    }

    fn hget_all(&self, key: &str) -> Result<FieldMap, KVStoreError> {
        self.check("hget_all", key)?;
        self.inner.hget_all(key)
    }

    fn hdel(&self, key: &str, field: &str) -> Result<bool, KVStoreError> {
        self.check("hdel", key)?;
        self.inner.hdel(key, field)
    }

    fn hincr_by(&self, key: &str, field: &str, delta: i64) -> Result<i64, KVStoreError> {
        self.check("hincr_by", key)?;
        self.inner.hincr_by(key, field, delta)
    }

    fn rpush(&self, key: &str, value: &[u8]) -> Result<usize, KVStoreError> {
        self.check("rpush", key)?;
        self.inner.rpush(key, value)
    }

    fn lrange(&self, key: &str, start: i64, stop: i64) -> Result<Vec<Vec<u8>>, KVStoreError> {
        self.check("lrange", key)?;
        self.inner.lrange(key, start, stop)
    }

    fn llen(&self, key: &str) -> Result<usize, KVStoreError> {
        self.check("llen", key)?;
        self.inner.llen(key)
    }

    fn sadd(&self, key: &str, member: &str) -> Result<bool, KVStoreError> {
        self.check("sadd", key)?;
        self.inner.sadd(key, member)
    }

    fn srem(&self, key: &str, member: &str) -> Result<bool, KVStoreError> {
        self.check("srem", key)?;
        self.inner.srem(key, member)
    }

    fn sismember(&self, key: &str, member: &str) -> Result<bool, KVStoreError> {
        self.check("sismember", key)?;
        self.inner.sismember(key, member)
    }

    fn scard(&self, key: &str) -> Result<usize, KVStoreError> {
        self.check("scard", key)?;
        self.inner.scard(key)
    }

    fn geo_add(&self, key: &str, member: &str, location: Geotag) -> Result<(), KVStoreError> {
        self.check("geo_add", key)?;
        self.inner.geo_add(key, member, location)
    }

    fn geo_remove(&self, key: &str, member: &str) -> Result<bool, KVStoreError> {
        self.check("geo_remove", key)?;
        self.inner.geo_remove(key, member)
    }

    fn geo_radius(
        &self,
        key: &str,
        center: &Geotag,
        radius_km: f64,
    ) -> Result<Vec<String>, KVStoreError> {
        self.check("geo_radius", key)?;
        self.inner.geo_radius(key, center, radius_km)
    }

    fn exists(&self, key: &str) -> Result<bool, KVStoreError> {
        self.check("exists", key)?;
        self.inner.exists(key)
    }

    fn expire(&self, key: &str, ttl: Duration) -> Result<bool, KVStoreError> {
        self.check("expire", key)?;
        self.inner.expire(key, ttl)
    }

    fn select(&self, namespace: u32) -> Result<(), KVStoreError> {
        self.inner.select(namespace)
    }

    fn flush_namespace(&self) -> Result<(), KVStoreError> {
        self.inner.flush_namespace()
    }
}
