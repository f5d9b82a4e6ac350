//! # ID Allocation
//!
//! Post and comment IDs come from one shared counter; user IDs from another.
//! An allocated ID is never reused, even if the record write that follows
//! fails.

use super::*;
use crate::domain::keys;
use beacon_types::{PostId, UserId};

impl<KV, TS> BeaconStorageService<KV, TS>
where
    KV: KeyValueStore,
    TS: TimeSource,
{
    pub(crate) fn next_post_id(&self) -> Result<PostId, StorageError> {
        self.allocate(keys::POST_COUNTER)
    }

    pub(crate) fn next_user_id(&self) -> Result<UserId, StorageError> {
        self.allocate(keys::USER_COUNTER)
    }

    fn allocate(&self, counter: &str) -> Result<u64, StorageError> {
        let value = self.store.incr(counter)?;
        if value < 1 {
            #[cfg(feature = "tracing-log")]
            tracing::warn!("[beacon-storage] counter {} returned {}", counter, value);
            return Err(StorageError::corruption(format!(
                "counter {} returned non-positive value {}",
                counter, value
            )));
        }
        Ok(value as u64)
    }
}
