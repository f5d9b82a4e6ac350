//! # Inbound Ports (Driving Ports)
//!
//! The storage facade consumed by the HTTP layer.
//!
//! Every operation takes `&self`; implementations are shared across request
//! handlers behind an `Arc` and rely on the store's per-command atomicity.

use crate::domain::errors::StorageError;
use beacon_types::{Beacon, Geotag, NewBeacon, NewComment, PostId, User, UserId};

/// Primary API of the beacon storage core.
pub trait BeaconStorageApi: Send + Sync {
    // =========================================================================
    // POSTS
    // =========================================================================

    /// Persist a new beacon and register its coordinate.
    ///
    /// ## Errors
    ///
    /// - `InvalidLocation`: coordinate out of range (no ID is allocated)
    /// - `Storage`: counter corruption or connectivity
    fn add_beacon(&self, beacon: NewBeacon) -> Result<PostId, StorageError>;

    /// A beacon without its comments.
    ///
    /// ## Errors
    ///
    /// - `NotFound`: no post with this ID, or the post is a comment
    /// - `Decode`: a stored field is malformed
    fn get_beacon(&self, id: PostId) -> Result<Beacon, StorageError>;

    /// A beacon with its comments in insertion order.
    ///
    /// ## Errors
    ///
    /// - `NotFound`: missing beacon, or a listed comment record is missing
    /// - `Storage`: a listed comment belongs to another beacon
    fn get_thread(&self, id: PostId) -> Result<Beacon, StorageError>;

    /// Persist a comment and append it to its beacon's thread.
    ///
    /// ## Errors
    ///
    /// - `NotFound`: the parent beacon does not exist (no ID is allocated)
    fn add_comment(&self, comment: NewComment) -> Result<PostId, StorageError>;

    /// Comment IDs of a beacon, oldest first.
    fn list_comments(&self, beacon_id: PostId) -> Result<Vec<PostId>, StorageError>;

    fn comment_count(&self, beacon_id: PostId) -> Result<usize, StorageError>;

    /// Beacons within `radius_miles` of `center`.
    ///
    /// ## Errors
    ///
    /// - `InvalidLocation`: center out of range
    /// - `Storage`: an indexed beacon has no record (and no TTL is configured)
    fn beacons_within(&self, center: Geotag, radius_miles: f64)
        -> Result<Vec<Beacon>, StorageError>;

    // =========================================================================
    // VOTES
    // =========================================================================

    /// ## Errors
    ///
    /// - `NotFound`: no such post
    /// - `AlreadyVoted`: the user already hearted this post
    fn heart(&self, post_id: PostId, user_id: UserId) -> Result<(), StorageError>;

    /// ## Errors
    ///
    /// - `NotFound`: no such post
    /// - `NotVoted`: the user has not hearted this post
    /// - `Storage`: the counter would go negative
    fn unheart(&self, post_id: PostId, user_id: UserId) -> Result<(), StorageError>;

    /// ## Errors
    ///
    /// - `NotFound`: no such post
    /// - `AlreadyVoted`: the user already flagged this post
    fn flag(&self, post_id: PostId, user_id: UserId) -> Result<(), StorageError>;

    fn has_hearted(&self, post_id: PostId, user_id: UserId) -> Result<bool, StorageError>;

    fn has_flagged(&self, post_id: PostId, user_id: UserId) -> Result<bool, StorageError>;

    // =========================================================================
    // USERS
    // =========================================================================

    /// Register a user.
    ///
    /// ## Errors
    ///
    /// - `UsernameExists`: checked before allocation, no ID burned
    /// - `EmailExists`: the email maps to another account
    fn create_user(
        &self,
        username: &str,
        auth_secret: &[u8],
        email: &str,
    ) -> Result<UserId, StorageError>;

    fn username_exists(&self, username: &str) -> Result<bool, StorageError>;

    fn email_exists(&self, email: &str) -> Result<bool, StorageError>;

    fn user_id_by_email(&self, email: &str) -> Result<UserId, StorageError>;

    fn get_user(&self, id: UserId) -> Result<User, StorageError>;

    fn get_username(&self, id: UserId) -> Result<String, StorageError>;

    /// `false` for unknown users. Always `true` for known users in
    /// Development and Test modes.
    fn authenticate(&self, user_id: UserId, auth_secret: &[u8]) -> Result<bool, StorageError>;

    /// Overwrite the stored secret.
    fn set_auth_secret(&self, user_id: UserId, auth_secret: &[u8]) -> Result<(), StorageError>;

    /// Generate, store and return a fresh secret.
    fn issue_secret(&self, user_id: UserId) -> Result<String, StorageError>;

    /// `authenticate`, turned into an error.
    fn require_authenticated(
        &self,
        user_id: UserId,
        auth_secret: &[u8],
    ) -> Result<(), StorageError> {
        if self.authenticate(user_id, auth_secret)? {
            Ok(())
        } else {
            Err(StorageError::AuthFailure { user_id })
        }
    }

    // =========================================================================
    // ADMIN
    // =========================================================================

    fn select_namespace(&self, namespace: u32) -> Result<(), StorageError>;

    /// Delete everything in the active namespace. Refused in Production mode.
    fn flush_namespace(&self) -> Result<(), StorageError>;
}
