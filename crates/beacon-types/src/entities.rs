//! # Core Domain Entities
//!
//! ## Clusters
//!
//! - **Posts**: `Beacon`, `Comment`, `PostKind` (both kinds share one ID space)
//! - **Location**: `Geotag`
//! - **Accounts**: `User`
//! - **Inputs**: `NewBeacon`, `NewComment` (what a caller submits before an
//!   ID, timestamp and counters are assigned)

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, Bytes};

/// Identifier drawn from the shared post/comment counter.
pub type PostId = u64;

/// Identifier drawn from the user counter.
pub type UserId = u64;

/// Unix timestamp in seconds since epoch.
pub type Timestamp = u64;

/// A point on the globe, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Geotag {
    pub latitude: f64,
    pub longitude: f64,
}

impl Geotag {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Discriminator stored alongside every post record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostKind {
    Beacon,
    Comment,
}

impl PostKind {
    /// The value written to the record's `type` field.
    pub const fn as_str(&self) -> &'static str {
        match self {
            PostKind::Beacon => "beacon",
            PostKind::Comment => "comment",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "beacon" => Some(PostKind::Beacon),
            "comment" => Some(PostKind::Comment),
            _ => None,
        }
    }
}

impl std::fmt::Display for PostKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A geotagged image post.
///
/// `comments` is empty unless the beacon was read as a thread.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Beacon {
    pub id: PostId,
    #[serde_as(as = "Bytes")]
    pub image: Vec<u8>,
    #[serde_as(as = "Bytes")]
    pub thumbnail: Vec<u8>,
    pub location: Geotag,
    pub poster_id: UserId,
    pub description: String,
    pub hearts: u32,
    pub flags: u32,
    pub created_at: Timestamp,
    pub comments: Vec<Comment>,
}

/// A text reply attached to a beacon.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Comment {
    pub id: PostId,
    pub poster_id: UserId,
    /// The parent beacon.
    pub beacon_id: PostId,
    pub text: String,
    pub hearts: u32,
    pub flags: u32,
    pub created_at: Timestamp,
}

/// A registered account.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    /// Opaque bearer secret. Never serialized.
    #[serde(skip)]
    pub auth_secret: Vec<u8>,
    pub account_created: Timestamp,
    pub hearts_received: u32,
    pub flags_received: u32,
    pub hearts_submitted: u32,
    pub flags_submitted: u32,
}

/// A beacon as submitted, before storage assigns its ID and timestamp.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NewBeacon {
    pub image: Vec<u8>,
    pub thumbnail: Vec<u8>,
    pub location: Geotag,
    pub poster_id: UserId,
    pub description: String,
}

/// A comment as submitted.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewComment {
    pub beacon_id: PostId,
    pub poster_id: UserId,
    pub text: String,
}
