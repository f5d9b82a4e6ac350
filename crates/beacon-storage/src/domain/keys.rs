//! # Key Schema
//!
//! Deterministic key names for every record the storage core writes.
//! These names are the on-store contract; changing one orphans existing data.

use crate::domain::types::VoteKind;
use beacon_types::{PostId, UserId};

/// Shared beacon/comment ID counter.
pub const POST_COUNTER: &str = "post-count";
/// User ID counter.
pub const USER_COUNTER: &str = "user-count";
/// Set of reserved usernames.
pub const USERNAMES: &str = "usernames";
/// Hash mapping email -> decimal user ID.
pub const EMAILS: &str = "emails";
/// Geospatial index of beacon coordinates.
pub const BEACON_LOCATIONS: &str = "beacon-locs";

const COMMENT_LIST_SUFFIX: &str = ":c";

/// Pure key derivation. No state.
pub struct KeySchema;

impl KeySchema {
    pub fn post(id: PostId) -> String {
        format!("p:{}", id)
    }

    /// Ordered comment-ID list of a beacon: the post key plus `:c`.
    pub fn comment_list(beacon_id: PostId) -> String {
        format!("{}{}", Self::post(beacon_id), COMMENT_LIST_SUFFIX)
    }

    pub fn vote_set(kind: VoteKind, post_id: PostId) -> String {
        format!("{}:{}", kind.set_prefix(), post_id)
    }

    pub fn user(id: UserId) -> String {
        format!("u:{}", id)
    }

    /// Vote-set members and geo member names are always decimal.
    pub fn member(id: u64) -> String {
        id.to_string()
    }
}
