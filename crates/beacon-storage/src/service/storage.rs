//! # Beacon Storage API Implementation
//!
//! Implements the BeaconStorageApi trait over the service's components.

use super::*;
use crate::domain::keys;
use crate::domain::types::{EntityKind, VoteKind};
use crate::ports::inbound::BeaconStorageApi;
use beacon_types::{Beacon, Geotag, NewBeacon, NewComment, PostId, User, UserId};

impl<KV, TS> BeaconStorageApi for BeaconStorageService<KV, TS>
where
    KV: KeyValueStore,
    TS: TimeSource,
{
    fn add_beacon(&self, beacon: NewBeacon) -> Result<PostId, StorageError> {
        self.create_beacon(beacon)
    }

    fn get_beacon(&self, id: PostId) -> Result<Beacon, StorageError> {
        self.load_beacon(id)
    }

    fn get_thread(&self, id: PostId) -> Result<Beacon, StorageError> {
        self.assemble_thread(id)
    }

    fn add_comment(&self, comment: NewComment) -> Result<PostId, StorageError> {
        self.create_comment(comment)
    }

    fn list_comments(&self, beacon_id: PostId) -> Result<Vec<PostId>, StorageError> {
        self.comment_ids(beacon_id)
    }

    fn comment_count(&self, beacon_id: PostId) -> Result<usize, StorageError> {
        self.count_comments(beacon_id)
    }

    fn beacons_within(
        &self,
        center: Geotag,
        radius_miles: f64,
    ) -> Result<Vec<Beacon>, StorageError> {
        self.radius_query(center, radius_miles)
    }

    fn heart(&self, post_id: PostId, user_id: UserId) -> Result<(), StorageError> {
        self.cast_vote(VoteKind::Heart, post_id, user_id)
    }

    fn unheart(&self, post_id: PostId, user_id: UserId) -> Result<(), StorageError> {
        self.retract_vote(VoteKind::Heart, post_id, user_id)
    }

    fn flag(&self, post_id: PostId, user_id: UserId) -> Result<(), StorageError> {
        self.cast_vote(VoteKind::Flag, post_id, user_id)
    }

    fn has_hearted(&self, post_id: PostId, user_id: UserId) -> Result<bool, StorageError> {
        self.has_voted(VoteKind::Heart, post_id, user_id)
    }

    fn has_flagged(&self, post_id: PostId, user_id: UserId) -> Result<bool, StorageError> {
        self.has_voted(VoteKind::Flag, post_id, user_id)
    }

    fn create_user(
        &self,
        username: &str,
        auth_secret: &[u8],
        email: &str,
    ) -> Result<UserId, StorageError> {
        self.register_user(username, auth_secret, email)
    }

    fn username_exists(&self, username: &str) -> Result<bool, StorageError> {
        Ok(self.store.sismember(keys::USERNAMES, username)?)
    }

    fn email_exists(&self, email: &str) -> Result<bool, StorageError> {
        Ok(self.lookup_email(email)?.is_some())
    }

    fn user_id_by_email(&self, email: &str) -> Result<UserId, StorageError> {
        self.lookup_email(email)?
            .ok_or_else(|| StorageError::not_found(EntityKind::User, email))
    }

    fn get_user(&self, id: UserId) -> Result<User, StorageError> {
        self.load_user(id)
    }

    fn get_username(&self, id: UserId) -> Result<String, StorageError> {
        self.load_username(id)
    }

    fn authenticate(&self, user_id: UserId, auth_secret: &[u8]) -> Result<bool, StorageError> {
        self.check_secret(user_id, auth_secret)
    }

    fn set_auth_secret(&self, user_id: UserId, auth_secret: &[u8]) -> Result<(), StorageError> {
        self.store_secret(user_id, auth_secret)
    }

    fn issue_secret(&self, user_id: UserId) -> Result<String, StorageError> {
        self.rotate_secret(user_id)
    }

    fn select_namespace(&self, namespace: u32) -> Result<(), StorageError> {
        self.store.select(namespace)?;

        #[cfg(feature = "tracing-log")]
        tracing::info!("[beacon-storage] selected namespace {}", namespace);

        Ok(())
    }

    fn flush_namespace(&self) -> Result<(), StorageError> {
        if self.config.mode == StorageMode::Production {
            return Err(StorageError::Storage(
                "flush refused in production mode".to_string(),
            ));
        }
        self.store.flush_namespace()?;

        #[cfg(feature = "tracing-log")]
        tracing::info!("[beacon-storage] 🧹 flushed active namespace");

        Ok(())
    }
}
