//! # Development Fixtures
//!
//! A small, fixed data set written through the facade itself when the
//! service starts in Development mode.

use super::*;
use crate::domain::types::VoteKind;
use beacon_types::{Geotag, NewBeacon, NewComment};

/// Campus quad the fixture beacons cluster around.
pub const FIXTURE_CENTER: Geotag = Geotag::new(33.2140, -87.5391);

/// (username, secret, email)
pub const FIXTURE_USERS: [(&str, &str, &str); 3] = [
    ("alice", "alice-dev-secret", "alice@example.com"),
    ("bob", "bob-dev-secret", "bob@example.com"),
    ("carol", "carol-dev-secret", "carol@example.com"),
];

/// (poster index, latitude offset, longitude offset, description)
const FIXTURE_BEACONS: [(usize, f64, f64, &str); 3] = [
    (0, 0.0, 0.0, "Free pizza outside the library"),
    (1, 0.0021, -0.0013, "Someone left a guitar on the bench"),
    (2, -0.0040, 0.0035, "Sunset from the parking deck"),
];

/// (beacon index, commenter index, text)
const FIXTURE_COMMENTS: [(usize, usize, &str); 4] = [
    (0, 1, "Still there?"),
    (0, 0, "Two boxes left"),
    (1, 2, "It's mine, be right there"),
    (2, 0, "Nice colors"),
];

/// 1x1 transparent PNG.
const FIXTURE_IMAGE: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44, 0x52,
    0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F, 0x15, 0xC4,
    0x89, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x00, 0x01, 0x00, 0x00,
    0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, 0x49, 0x45, 0x4E, 0x44, 0xAE,
    0x42, 0x60, 0x82,
];

impl<KV, TS> BeaconStorageService<KV, TS>
where
    KV: KeyValueStore,
    TS: TimeSource,
{
    pub(crate) fn seed_fixtures(&self) -> Result<(), StorageError> {
        let mut users = Vec::with_capacity(FIXTURE_USERS.len());
        for (username, secret, email) in FIXTURE_USERS {
            users.push(self.register_user(username, secret.as_bytes(), email)?);
        }

        let mut beacons = Vec::with_capacity(FIXTURE_BEACONS.len());
        for (poster, d_lat, d_lon, description) in FIXTURE_BEACONS {
            beacons.push(self.create_beacon(NewBeacon {
                image: FIXTURE_IMAGE.to_vec(),
                thumbnail: FIXTURE_IMAGE.to_vec(),
                location: Geotag::new(
                    FIXTURE_CENTER.latitude + d_lat,
                    FIXTURE_CENTER.longitude + d_lon,
                ),
                poster_id: users[poster],
                description: description.to_string(),
            })?);
        }

        for (beacon, commenter, text) in FIXTURE_COMMENTS {
            self.create_comment(NewComment {
                beacon_id: beacons[beacon],
                poster_id: users[commenter],
                text: text.to_string(),
            })?;
        }

        // Everyone hearts the first beacon; bob flags the last.
        for user in &users {
            self.cast_vote(VoteKind::Heart, beacons[0], *user)?;
        }
        self.cast_vote(VoteKind::Flag, beacons[2], users[1])?;

        #[cfg(feature = "tracing-log")]
        tracing::info!(
            "[beacon-storage] 🌱 seeded {} users, {} beacons, {} comments",
            users.len(),
            beacons.len(),
            FIXTURE_COMMENTS.len()
        );

        Ok(())
    }
}
