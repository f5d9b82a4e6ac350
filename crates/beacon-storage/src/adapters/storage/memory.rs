use crate::adapters::infra::SystemTimeSource;
use crate::domain::codec::FieldMap;
use crate::domain::errors::KVStoreError;
use crate::domain::geo;
use crate::ports::outbound::{KeyValueStore, TimeSource};
use beacon_types::{Geotag, Timestamp};
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone)]
enum Value {
    Str(Vec<u8>),
    Hash(HashMap<String, Vec<u8>>),
    List(Vec<Vec<u8>>),
    Set(HashSet<String>),
    Geo(HashMap<String, Geotag>),
}

impl Value {
    fn type_name(&self) -> &'static str {
        match self {
            Value::Str(_) => "string",
            Value::Hash(_) => "hash",
            Value::List(_) => "list",
            Value::Set(_) => "set",
            Value::Geo(_) => "geo",
        }
    }
}

#[derive(Debug, Clone)]
struct Entry {
    value: Value,
    expires_at: Option<Timestamp>,
}

impl Entry {
    fn new(value: Value) -> Self {
        Self {
            value,
            expires_at: None,
        }
    }

    fn is_expired(&self, now: Timestamp) -> bool {
        matches!(self.expires_at, Some(at) if now >= at)
    }
}

type Namespace = HashMap<String, Entry>;

/// In-memory keyed store.
///
/// Thread-safe reference implementation of `KeyValueStore`: one
/// `RwLock`-guarded map per namespace, lazy expiry against an injected
/// clock. Every trait method takes the lock once, so each command is atomic
/// exactly like a single round trip to a table server.
///
/// Expired entries are also swept from the active namespace by the first
/// write of each clock second, so keys never touched again do not pile up.
pub struct InMemoryStore {
    namespaces: RwLock<HashMap<u32, Namespace>>,
    active: AtomicU32,
    last_sweep: AtomicU64,
    time_source: Arc<dyn TimeSource>,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::with_time_source(Arc::new(SystemTimeSource))
    }

    pub fn with_time_source(time_source: Arc<dyn TimeSource>) -> Self {
        Self {
            namespaces: RwLock::new(HashMap::new()),
            active: AtomicU32::new(0),
            last_sweep: AtomicU64::new(0),
            time_source,
        }
    }

    pub fn active_namespace(&self) -> u32 {
        self.active.load(Ordering::SeqCst)
    }

    /// Number of live keys in the active namespace.
    pub fn key_count(&self) -> usize {
        let now = self.time_source.now();
        let guard = self.namespaces.read();
        guard
            .get(&self.active_namespace())
            .map(|ns| ns.values().filter(|e| !e.is_expired(now)).count())
            .unwrap_or(0)
    }

    fn read<R>(
        &self,
        key: &str,
        f: impl FnOnce(Option<&Value>) -> Result<R, KVStoreError>,
    ) -> Result<R, KVStoreError> {
        let now = self.time_source.now();
        let guard = self.namespaces.read();
        let value = guard
            .get(&self.active_namespace())
            .and_then(|ns| ns.get(key))
            .filter(|e| !e.is_expired(now))
            .map(|e| &e.value);
        f(value)
    }

    fn write<R>(
        &self,
        f: impl FnOnce(&mut Namespace, Timestamp) -> Result<R, KVStoreError>,
    ) -> Result<R, KVStoreError> {
        let now = self.time_source.now();
        let mut guard = self.namespaces.write();
        let ns = guard.entry(self.active_namespace()).or_default();
        if self.last_sweep.swap(now, Ordering::SeqCst) != now {
            sweep_expired(ns, now);
        }
        f(ns, now)
    }
}

fn wrong_type(key: &str, value: &Value) -> KVStoreError {
    KVStoreError::WrongType {
        key: key.to_string(),
        found: value.type_name(),
    }
}

fn not_an_integer(key: &str) -> KVStoreError {
    KVStoreError::CorruptionError {
        message: format!("value at {} is not an integer", key),
    }
}

fn purge_expired(ns: &mut Namespace, key: &str, now: Timestamp) {
    if ns.get(key).is_some_and(|e| e.is_expired(now)) {
        ns.remove(key);
    }
}

fn sweep_expired(ns: &mut Namespace, now: Timestamp) {
    ns.retain(|_, entry| !entry.is_expired(now));
}

/// Live entry for `key`, created with `init` if absent.
fn entry_or_insert<'a>(
    ns: &'a mut Namespace,
    key: &str,
    now: Timestamp,
    init: fn() -> Value,
) -> &'a mut Entry {
    purge_expired(ns, key, now);
    ns.entry(key.to_string())
        .or_insert_with(|| Entry::new(init()))
}

fn parse_i64(bytes: &[u8]) -> Option<i64> {
    std::str::from_utf8(bytes).ok()?.parse().ok()
}

/// Resolve an inclusive, possibly negative index pair against a length.
fn list_bounds(len: usize, start: i64, stop: i64) -> Option<(usize, usize)> {
    let len = len as i64;
    let start = if start < 0 { (len + start).max(0) } else { start };
    let stop = if stop < 0 { len + stop } else { stop.min(len - 1) };
    if len == 0 || start > stop || start >= len || stop < 0 {
        return None;
    }
    Some((start as usize, stop as usize))
}

impl KeyValueStore for InMemoryStore {
    fn incr(&self, key: &str) -> Result<i64, KVStoreError> {
        self.write(|ns, now| {
            let entry = entry_or_insert(ns, key, now, || Value::Str(b"0".to_vec()));
            match &mut entry.value {
                Value::Str(bytes) => {
                    let next = parse_i64(bytes)
                        .and_then(|n| n.checked_add(1))
                        .ok_or_else(|| not_an_integer(key))?;
                    *bytes = next.to_string().into_bytes();
                    Ok(next)
                }
                other => Err(wrong_type(key, other)),
            }
        })
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, KVStoreError> {
        self.read(key, |value| match value {
            None => Ok(None),
            Some(Value::Str(bytes)) => Ok(Some(bytes.clone())),
            Some(other) => Err(wrong_type(key, other)),
        })
    }

    fn hset_multiple(&self, key: &str, fields: &[(&str, Vec<u8>)]) -> Result<(), KVStoreError> {
        self.write(|ns, now| {
            let entry = entry_or_insert(ns, key, now, || Value::Hash(HashMap::new()));
            match &mut entry.value {
                Value::Hash(hash) => {
                    for (field, value) in fields {
                        hash.insert(field.to_string(), value.clone());
                    }
                    Ok(())
                }
                other => Err(wrong_type(key, other)),
            }
        })
    }

    fn hset(&self, key: &str, field: &str, value: &[u8]) -> Result<(), KVStoreError> {
        self.hset_multiple(key, &[(field, value.to_vec())])
    }

    fn hset_nx(&self, key: &str, field: &str, value: &[u8]) -> Result<bool, KVStoreError> {
        self.write(|ns, now| {
            let entry = entry_or_insert(ns, key, now, || Value::Hash(HashMap::new()));
            match &mut entry.value {
                Value::Hash(hash) => {
                    if hash.contains_key(field) {
                        return Ok(false);
                    }
                    hash.insert(field.to_string(), value.to_vec());
                    Ok(true)
                }
                other => Err(wrong_type(key, other)),
            }
        })
    }

    fn hget(&self, key: &str, field: &str) -> Result<Option<Vec<u8>>, KVStoreError> {
        self.read(key, |value| match value {
            None => Ok(None),
            Some(Value::Hash(hash)) => Ok(hash.get(field).cloned()),
            Some(other) => Err(wrong_type(key, other)),
        })
    }

    fn hget_all(&self, key: &str) -> Result<FieldMap, KVStoreError> {
        self.read(key, |value| match value {
            None => Ok(FieldMap::new()),
            Some(Value::Hash(hash)) => Ok(hash.clone()),
            Some(other) => Err(wrong_type(key, other)),
        })
    }

    fn hdel(&self, key: &str, field: &str) -> Result<bool, KVStoreError> {
        self.write(|ns, now| {
            purge_expired(ns, key, now);
            let Some(entry) = ns.get_mut(key) else {
                return Ok(false);
            };
            let (removed, now_empty) = match &mut entry.value {
                Value::Hash(hash) => (hash.remove(field).is_some(), hash.is_empty()),
                other => return Err(wrong_type(key, other)),
            };
            if now_empty {
                ns.remove(key);
            }
            Ok(removed)
        })
    }

    fn hincr_by(&self, key: &str, field: &str, delta: i64) -> Result<i64, KVStoreError> {
        self.write(|ns, now| {
            let entry = entry_or_insert(ns, key, now, || Value::Hash(HashMap::new()));
            match &mut entry.value {
                Value::Hash(hash) => {
                    let current = match hash.get(field) {
                        Some(bytes) => parse_i64(bytes).ok_or_else(|| not_an_integer(key))?,
                        None => 0,
                    };
                    let next = current
                        .checked_add(delta)
                        .ok_or_else(|| not_an_integer(key))?;
                    hash.insert(field.to_string(), next.to_string().into_bytes());
                    Ok(next)
                }
                other => Err(wrong_type(key, other)),
            }
        })
    }

    fn rpush(&self, key: &str, value: &[u8]) -> Result<usize, KVStoreError> {
        self.write(|ns, now| {
            let entry = entry_or_insert(ns, key, now, || Value::List(Vec::new()));
            match &mut entry.value {
                Value::List(list) => {
                    list.push(value.to_vec());
                    Ok(list.len())
                }
                other => Err(wrong_type(key, other)),
            }
        })
    }

    fn lrange(&self, key: &str, start: i64, stop: i64) -> Result<Vec<Vec<u8>>, KVStoreError> {
        self.read(key, |value| match value {
            None => Ok(Vec::new()),
            Some(Value::List(list)) => Ok(list_bounds(list.len(), start, stop)
                .map(|(from, to)| list[from..=to].to_vec())
                .unwrap_or_default()),
            Some(other) => Err(wrong_type(key, other)),
        })
    }

    fn llen(&self, key: &str) -> Result<usize, KVStoreError> {
        self.read(key, |value| match value {
            None => Ok(0),
            Some(Value::List(list)) => Ok(list.len()),
            Some(other) => Err(wrong_type(key, other)),
        })
    }

    fn sadd(&self, key: &str, member: &str) -> Result<bool, KVStoreError> {
        self.write(|ns, now| {
            let entry = entry_or_insert(ns, key, now, || Value::Set(HashSet::new()));
            match &mut entry.value {
                Value::Set(set) => Ok(set.insert(member.to_string())),
                other => Err(wrong_type(key, other)),
            }
        })
    }

    fn srem(&self, key: &str, member: &str) -> Result<bool, KVStoreError> {
        self.write(|ns, now| {
            purge_expired(ns, key, now);
            let Some(entry) = ns.get_mut(key) else {
                return Ok(false);
            };
            let (removed, now_empty) = match &mut entry.value {
                Value::Set(set) => (set.remove(member), set.is_empty()),
                other => return Err(wrong_type(key, other)),
            };
            // Empty sets do not exist.
            if now_empty {
                ns.remove(key);
            }
            Ok(removed)
        })
    }

    fn sismember(&self, key: &str, member: &str) -> Result<bool, KVStoreError> {
        self.read(key, |value| match value {
            None => Ok(false),
            Some(Value::Set(set)) => Ok(set.contains(member)),
            Some(other) => Err(wrong_type(key, other)),
        })
    }

    fn scard(&self, key: &str) -> Result<usize, KVStoreError> {
        self.read(key, |value| match value {
            None => Ok(0),
            Some(Value::Set(set)) => Ok(set.len()),
            Some(other) => Err(wrong_type(key, other)),
        })
    }

    fn geo_add(&self, key: &str, member: &str, location: Geotag) -> Result<(), KVStoreError> {
        self.write(|ns, now| {
            let entry = entry_or_insert(ns, key, now, || Value::Geo(HashMap::new()));
            match &mut entry.value {
                Value::Geo(points) => {
                    points.insert(member.to_string(), location);
                    Ok(())
                }
                other => Err(wrong_type(key, other)),
            }
        })
    }

    fn geo_remove(&self, key: &str, member: &str) -> Result<bool, KVStoreError> {
        self.write(|ns, now| {
            purge_expired(ns, key, now);
            let Some(entry) = ns.get_mut(key) else {
                return Ok(false);
            };
            let (removed, now_empty) = match &mut entry.value {
                Value::Geo(points) => (points.remove(member).is_some(), points.is_empty()),
                other => return Err(wrong_type(key, other)),
            };
            if now_empty {
                ns.remove(key);
            }
            Ok(removed)
        })
    }

    fn geo_radius(
        &self,
        key: &str,
        center: &Geotag,
        radius_km: f64,
    ) -> Result<Vec<String>, KVStoreError> {
        self.read(key, |value| match value {
            None => Ok(Vec::new()),
            Some(Value::Geo(points)) => {
                let mut hits: Vec<(f64, &String)> = points
                    .iter()
                    .map(|(member, at)| (geo::distance_km(center, at), member))
                    .filter(|(distance, _)| *distance <= radius_km)
                    .collect();
                // Nearest first; ties broken by member name.
                hits.sort_by(|a, b| a.0.total_cmp(&b.0).then_with(|| a.1.cmp(b.1)));
                Ok(hits.into_iter().map(|(_, member)| member.clone()).collect())
            }
            Some(other) => Err(wrong_type(key, other)),
        })
    }

    fn exists(&self, key: &str) -> Result<bool, KVStoreError> {
        self.read(key, |value| Ok(value.is_some()))
    }

    fn expire(&self, key: &str, ttl: Duration) -> Result<bool, KVStoreError> {
        self.write(|ns, now| {
            purge_expired(ns, key, now);
            match ns.get_mut(key) {
                Some(entry) => {
                    entry.expires_at = Some(now.saturating_add(ttl.as_secs()));
                    Ok(true)
                }
                None => Ok(false),
            }
        })
    }

    fn select(&self, namespace: u32) -> Result<(), KVStoreError> {
        self.active.store(namespace, Ordering::SeqCst);
        Ok(())
    }

    fn flush_namespace(&self) -> Result<(), KVStoreError> {
        let mut guard = self.namespaces.write();
        guard.remove(&self.active_namespace());
        Ok(())
    }
}
