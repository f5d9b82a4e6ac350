//! # Vote Ledger
//!
//! At most one heart and one flag per (post, user). Membership lives in a
//! per-post set; the post's counter mirrors the set's cardinality.
//!
//! The set-add / set-remove result is the membership test, so of N
//! identical concurrent requests exactly one changes the counter.

use super::*;
use crate::domain::codec::fields;
use crate::domain::keys::KeySchema;
use crate::domain::types::{EntityKind, VoteKind};
use beacon_types::{PostId, UserId};

impl<KV, TS> BeaconStorageService<KV, TS>
where
    KV: KeyValueStore,
    TS: TimeSource,
{
    pub(crate) fn cast_vote(
        &self,
        kind: VoteKind,
        post_id: PostId,
        user_id: UserId,
    ) -> Result<(), StorageError> {
        if !self.post_exists(post_id)? {
            return Err(StorageError::not_found(EntityKind::Post, post_id));
        }

        let set_key = KeySchema::vote_set(kind, post_id);
        let member = KeySchema::member(user_id);
        if !self.store.sadd(&set_key, &member)? {
            return Err(StorageError::AlreadyVoted {
                kind,
                post_id,
                user_id,
            });
        }

        #[allow(unused_variables)]
        let count = match self.apply_vote(kind, post_id, 1) {
            Ok(count) => count,
            Err(e) => {
                self.store.srem(&set_key, &member)?;
                return Err(e);
            }
        };

        #[cfg(feature = "tracing-log")]
        tracing::debug!(
            "[beacon-storage] {} on post {} by user {} (now {})",
            kind,
            post_id,
            user_id,
            count
        );

        Ok(())
    }

    pub(crate) fn retract_vote(
        &self,
        kind: VoteKind,
        post_id: PostId,
        user_id: UserId,
    ) -> Result<(), StorageError> {
        if !self.post_exists(post_id)? {
            return Err(StorageError::not_found(EntityKind::Post, post_id));
        }

        let set_key = KeySchema::vote_set(kind, post_id);
        let member = KeySchema::member(user_id);
        if !self.store.srem(&set_key, &member)? {
            return Err(StorageError::NotVoted {
                kind,
                post_id,
                user_id,
            });
        }

        let count = match self.apply_vote(kind, post_id, -1) {
            Ok(count) => count,
            // The post and its votes are gone together.
            Err(e) if e.is_not_found() => return Err(e),
            Err(e) => {
                self.store.sadd(&set_key, &member)?;
                return Err(e);
            }
        };
        if count < 0 {
            #[cfg(feature = "tracing-log")]
            tracing::warn!(
                "[beacon-storage] {} counter of post {} went negative ({})",
                kind,
                post_id,
                count
            );
            return Err(StorageError::corruption(format!(
                "{} counter of post {} is negative ({})",
                kind, post_id, count
            )));
        }

        #[cfg(feature = "tracing-log")]
        tracing::debug!(
            "[beacon-storage] un{} on post {} by user {} (now {})",
            kind,
            post_id,
            user_id,
            count
        );

        Ok(())
    }

    /// Refresh the post and move its counter by `delta`.
    ///
    /// A post that expires between the refresh and the increment would be
    /// recreated as a bare counter; that remnant is removed again and the
    /// post reported missing.
    fn apply_vote(
        &self,
        kind: VoteKind,
        post_id: PostId,
        delta: i64,
    ) -> Result<i64, StorageError> {
        let gone = || StorageError::not_found(EntityKind::Post, post_id);
        if !self.touch_post(post_id)? {
            return Err(gone());
        }

        let key = KeySchema::post(post_id);
        let count = self.store.hincr_by(&key, kind.counter_field(), delta)?;
        if self.store.hget(&key, fields::KIND)?.is_none() {
            self.store.hdel(&key, kind.counter_field())?;
            #[cfg(feature = "tracing-log")]
            tracing::debug!(
                "[beacon-storage] post {} expired during {} update",
                post_id,
                kind
            );
            return Err(gone());
        }
        Ok(count)
    }

    /// Membership only; an unknown post simply has no voters.
    pub(crate) fn has_voted(
        &self,
        kind: VoteKind,
        post_id: PostId,
        user_id: UserId,
    ) -> Result<bool, StorageError> {
        Ok(self.store.sismember(
            &KeySchema::vote_set(kind, post_id),
            &KeySchema::member(user_id),
        )?)
    }
}
