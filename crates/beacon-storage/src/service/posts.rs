//! # Post Records
//!
//! Beacon and comment hashes share one key format (`p:<id>`); the `type`
//! field decides which decoder applies.

use super::*;
use crate::domain::codec::{fields, DecodeError, FieldMap, PostRecord};
use crate::domain::geo;
use crate::domain::keys::KeySchema;
use crate::domain::types::EntityKind;
use beacon_types::{Beacon, Comment, NewBeacon, NewComment, PostId, PostKind};

impl<KV, TS> BeaconStorageService<KV, TS>
where
    KV: KeyValueStore,
    TS: TimeSource,
{
    /// Allocate an ID, write the beacon hash and index its coordinate.
    pub(crate) fn create_beacon(&self, new: NewBeacon) -> Result<PostId, StorageError> {
        if !geo::is_valid(&new.location) {
            return Err(StorageError::InvalidLocation {
                latitude: new.location.latitude,
                longitude: new.location.longitude,
            });
        }

        let id = self.next_post_id()?;
        let beacon = Beacon {
            id,
            image: new.image,
            thumbnail: new.thumbnail,
            location: new.location,
            poster_id: new.poster_id,
            description: new.description,
            hearts: 0,
            flags: 0,
            created_at: self.now(),
            comments: Vec::new(),
        };

        let key = KeySchema::post(id);
        self.store
            .hset_multiple(&key, &self.codec.encode_beacon(&beacon))?;
        self.touch_post(id)?;
        self.index_location(id, beacon.location)?;

        #[cfg(feature = "tracing-log")]
        tracing::debug!(
            "[beacon-storage] beacon {} by user {} at ({}, {})",
            id,
            beacon.poster_id,
            beacon.location.latitude,
            beacon.location.longitude
        );

        Ok(id)
    }

    /// Allocate an ID, write the comment hash, then append it to the thread.
    ///
    /// The parent is checked first so a bad parent burns no ID. The record
    /// is written before the list push so the list never points at an
    /// unwritten record.
    pub(crate) fn create_comment(&self, new: NewComment) -> Result<PostId, StorageError> {
        match self.load_post(new.beacon_id)? {
            Some(PostRecord::Beacon(_)) => {}
            _ => return Err(StorageError::not_found(EntityKind::Beacon, new.beacon_id)),
        }

        let id = self.next_post_id()?;
        let comment = Comment {
            id,
            poster_id: new.poster_id,
            beacon_id: new.beacon_id,
            text: new.text,
            hearts: 0,
            flags: 0,
            created_at: self.now(),
        };

        let key = KeySchema::post(id);
        self.store
            .hset_multiple(&key, &self.codec.encode_comment(&comment))?;
        self.touch_post(id)?;
        self.append_comment(comment.beacon_id, id)?;
        // A live conversation keeps its beacon alive.
        self.touch_post(comment.beacon_id)?;

        #[cfg(feature = "tracing-log")]
        tracing::debug!(
            "[beacon-storage] comment {} on beacon {} by user {}",
            id,
            comment.beacon_id,
            comment.poster_id
        );

        Ok(id)
    }

    /// Decode whatever post lives at `id`, or `None` if nothing does.
    pub(crate) fn load_post(&self, id: PostId) -> Result<Option<PostRecord>, StorageError> {
        let key = KeySchema::post(id);
        let Some(map) = self.post_fields(&key)? else {
            return Ok(None);
        };
        self.codec
            .decode_post(id, &map)
            .map(Some)
            .map_err(|e| StorageError::decode(key, e))
    }

    /// A beacon without comments. Comments and missing posts are `NotFound`.
    pub(crate) fn load_beacon(&self, id: PostId) -> Result<Beacon, StorageError> {
        match self.load_post(id)? {
            Some(PostRecord::Beacon(beacon)) => Ok(beacon),
            _ => Err(StorageError::not_found(EntityKind::Beacon, id)),
        }
    }

    /// A comment, or `None` if its record is gone.
    pub(crate) fn load_comment(&self, id: PostId) -> Result<Option<Comment>, StorageError> {
        let key = KeySchema::post(id);
        let Some(map) = self.post_fields(&key)? else {
            return Ok(None);
        };
        match self.codec.decode_post(id, &map) {
            Ok(PostRecord::Comment(comment)) => Ok(Some(comment)),
            Ok(PostRecord::Beacon(_)) => Err(StorageError::decode(
                key,
                DecodeError::KindMismatch {
                    expected: PostKind::Comment,
                    found: PostKind::Beacon,
                },
            )),
            Err(e) => Err(StorageError::decode(key, e)),
        }
    }

    /// Raw fields of a post record.
    ///
    /// With expiring records, a hash without a `type` field is the remnant
    /// of a record that expired under a concurrent counter update, and
    /// reads as missing.
    fn post_fields(&self, key: &str) -> Result<Option<FieldMap>, StorageError> {
        let map = self.store.hget_all(key)?;
        if map.is_empty() || (self.records_expire() && !map.contains_key(fields::KIND)) {
            return Ok(None);
        }
        Ok(Some(map))
    }

    pub(crate) fn post_exists(&self, id: PostId) -> Result<bool, StorageError> {
        Ok(self.store.exists(&KeySchema::post(id))?)
    }
}
