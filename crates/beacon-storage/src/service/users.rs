//! # User Store
//!
//! Username uniqueness is a reservation set; email uniqueness is the
//! email -> ID hash. Both are claimed with single atomic commands.

use super::*;
use crate::domain::codec::fields;
use crate::domain::keys::{self, KeySchema};
use crate::domain::secret;
use crate::domain::types::EntityKind;
use beacon_types::{User, UserId};

impl<KV, TS> BeaconStorageService<KV, TS>
where
    KV: KeyValueStore,
    TS: TimeSource,
{
    /// Register a user.
    ///
    /// 1. Reserve the username (no ID is allocated on conflict)
    /// 2. Reject an already-mapped email, releasing the username
    /// 3. Allocate the ID
    /// 4. Claim the email; a lost race releases the username (ID is burned)
    /// 5. Write the user hash; on failure release both the email and the username
    pub(crate) fn register_user(
        &self,
        username: &str,
        auth_secret: &[u8],
        email: &str,
    ) -> Result<UserId, StorageError> {
        if !self.store.sadd(keys::USERNAMES, username)? {
            return Err(StorageError::UsernameExists {
                username: username.to_string(),
            });
        }

        match self.claim_email_and_write(username, auth_secret, email) {
            Ok(id) => Ok(id),
            Err(e) => {
                self.store.srem(keys::USERNAMES, username)?;
                Err(e)
            }
        }
    }

    fn claim_email_and_write(
        &self,
        username: &str,
        auth_secret: &[u8],
        email: &str,
    ) -> Result<UserId, StorageError> {
        let email_taken = || StorageError::EmailExists {
            email: email.to_string(),
        };

        if self.lookup_email(email)?.is_some() {
            return Err(email_taken());
        }

        let id = self.next_user_id()?;
        if !self
            .store
            .hset_nx(keys::EMAILS, email, KeySchema::member(id).as_bytes())?
        {
            return Err(email_taken());
        }

        let user = User {
            id,
            username: username.to_string(),
            email: email.to_string(),
            auth_secret: auth_secret.to_vec(),
            account_created: self.now(),
            ..Default::default()
        };
        if let Err(e) = self
            .store
            .hset_multiple(&KeySchema::user(id), &self.codec.encode_user(&user))
        {
            // An email must never map to an unwritten user.
            self.store.hdel(keys::EMAILS, email)?;
            return Err(e.into());
        }

        #[cfg(feature = "tracing-log")]
        tracing::debug!("[beacon-storage] user {} registered as {}", id, username);

        Ok(id)
    }

    pub(crate) fn lookup_email(&self, email: &str) -> Result<Option<UserId>, StorageError> {
        let Some(raw) = self.store.hget(keys::EMAILS, email)? else {
            return Ok(None);
        };
        std::str::from_utf8(&raw)
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Some)
            .ok_or_else(|| {
                StorageError::corruption(format!("email mapping for {} is not a user ID", email))
            })
    }

    pub(crate) fn load_user(&self, id: UserId) -> Result<User, StorageError> {
        let key = KeySchema::user(id);
        let map = self.store.hget_all(&key)?;
        if map.is_empty() {
            return Err(StorageError::not_found(EntityKind::User, id));
        }
        self.codec
            .decode_user(&map)
            .map_err(|e| StorageError::decode(key, e))
    }

    pub(crate) fn load_username(&self, id: UserId) -> Result<String, StorageError> {
        let key = KeySchema::user(id);
        let raw = self
            .store
            .hget(&key, fields::USERNAME)?
            .ok_or_else(|| StorageError::not_found(EntityKind::User, id))?;
        String::from_utf8(raw).map_err(|_| {
            StorageError::decode(
                key,
                crate::domain::codec::DecodeError::InvalidUtf8(fields::USERNAME),
            )
        })
    }

    pub(crate) fn user_exists(&self, id: UserId) -> Result<bool, StorageError> {
        Ok(self.store.exists(&KeySchema::user(id))?)
    }

    /// Unknown users never authenticate. Known users always do in
    /// Development and Test modes.
    pub(crate) fn check_secret(
        &self,
        user_id: UserId,
        supplied: &[u8],
    ) -> Result<bool, StorageError> {
        let Some(stored) = self.store.hget(&KeySchema::user(user_id), fields::AUTH)? else {
            return Ok(false);
        };
        if self.config.mode.bypasses_auth() {
            return Ok(true);
        }
        Ok(secret::secrets_match(&stored, supplied))
    }

    pub(crate) fn store_secret(&self, user_id: UserId, secret: &[u8]) -> Result<(), StorageError> {
        if !self.user_exists(user_id)? {
            return Err(StorageError::not_found(EntityKind::User, user_id));
        }
        self.store
            .hset(&KeySchema::user(user_id), fields::AUTH, secret)?;

        #[cfg(feature = "tracing-log")]
        tracing::debug!("[beacon-storage] rotated secret of user {}", user_id);

        Ok(())
    }

    pub(crate) fn rotate_secret(&self, user_id: UserId) -> Result<String, StorageError> {
        let fresh = secret::generate_secret();
        self.store_secret(user_id, fresh.as_bytes())?;
        Ok(fresh)
    }
}
