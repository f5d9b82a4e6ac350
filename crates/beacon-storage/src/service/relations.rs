//! # Relation Index
//!
//! Each beacon owns a list of comment IDs. Insertion order is display
//! order; the list is never re-sorted.

use super::*;
use crate::domain::keys::KeySchema;
use crate::domain::types::EntityKind;
use beacon_types::{Beacon, PostId};

impl<KV, TS> BeaconStorageService<KV, TS>
where
    KV: KeyValueStore,
    TS: TimeSource,
{
    pub(crate) fn append_comment(
        &self,
        beacon_id: PostId,
        comment_id: PostId,
    ) -> Result<(), StorageError> {
        let key = KeySchema::comment_list(beacon_id);
        self.store
            .rpush(&key, &self.codec.encode_list_id(comment_id))?;
        self.touch(&key)?;
        Ok(())
    }

    pub(crate) fn comment_ids(&self, beacon_id: PostId) -> Result<Vec<PostId>, StorageError> {
        let key = KeySchema::comment_list(beacon_id);
        self.store
            .lrange(&key, 0, -1)?
            .iter()
            .map(|entry| {
                self.codec
                    .decode_list_id(entry)
                    .map_err(|e| StorageError::decode(key.as_str(), e))
            })
            .collect()
    }

    pub(crate) fn count_comments(&self, beacon_id: PostId) -> Result<usize, StorageError> {
        Ok(self.store.llen(&KeySchema::comment_list(beacon_id))?)
    }

    /// Beacon plus its comments, oldest first.
    ///
    /// N+1 independent reads: a comment added mid-assembly may or may not
    /// appear. A listed comment whose record is missing fails the whole
    /// assembly unless records expire, in which case it is skipped.
    pub(crate) fn assemble_thread(&self, beacon_id: PostId) -> Result<Beacon, StorageError> {
        let mut beacon = self.load_beacon(beacon_id)?;

        for comment_id in self.comment_ids(beacon_id)? {
            let Some(comment) = self.load_comment(comment_id)? else {
                if self.records_expire() {
                    continue;
                }
                #[cfg(feature = "tracing-log")]
                tracing::warn!(
                    "[beacon-storage] beacon {} lists missing comment {}",
                    beacon_id,
                    comment_id
                );
                return Err(StorageError::not_found(EntityKind::Comment, comment_id));
            };

            if comment.beacon_id != beacon_id {
                #[cfg(feature = "tracing-log")]
                tracing::warn!(
                    "[beacon-storage] comment {} listed under beacon {} names parent {}",
                    comment_id,
                    beacon_id,
                    comment.beacon_id
                );
                return Err(StorageError::corruption(format!(
                    "comment {} listed under beacon {} belongs to beacon {}",
                    comment_id, beacon_id, comment.beacon_id
                )));
            }

            beacon.comments.push(comment);
        }

        Ok(beacon)
    }
}
