//! # Geo Index
//!
//! One global geospatial structure holds every beacon's coordinate, keyed by
//! the decimal post ID.

use super::*;
use crate::domain::geo;
use crate::domain::keys::{self, KeySchema};
use crate::domain::types::EntityKind;
use beacon_types::{Beacon, Geotag, PostId};

impl<KV, TS> BeaconStorageService<KV, TS>
where
    KV: KeyValueStore,
    TS: TimeSource,
{
    pub(crate) fn index_location(&self, id: PostId, location: Geotag) -> Result<(), StorageError> {
        self.store
            .geo_add(keys::BEACON_LOCATIONS, &KeySchema::member(id), location)?;
        Ok(())
    }

    /// Beacons within `radius_miles` of `center`, nearest first.
    ///
    /// When records expire, index members whose beacon is gone are pruned
    /// and skipped. Otherwise a dangling member is corruption.
    pub(crate) fn radius_query(
        &self,
        center: Geotag,
        radius_miles: f64,
    ) -> Result<Vec<Beacon>, StorageError> {
        if !geo::is_valid(&center) {
            return Err(StorageError::InvalidLocation {
                latitude: center.latitude,
                longitude: center.longitude,
            });
        }

        let radius_km = geo::miles_to_kilometers(radius_miles);
        let members = self
            .store
            .geo_radius(keys::BEACON_LOCATIONS, &center, radius_km)?;

        let mut beacons = Vec::with_capacity(members.len());
        for member in members {
            let id: PostId = member.parse().map_err(|_| {
                StorageError::corruption(format!("geo member {:?} is not a post ID", member))
            })?;

            match self.load_beacon(id) {
                Ok(beacon) => beacons.push(beacon),
                Err(e) if e.is_not_found() && self.records_expire() => {
                    self.store.geo_remove(keys::BEACON_LOCATIONS, &member)?;
                    #[cfg(feature = "tracing-log")]
                    tracing::debug!("[beacon-storage] pruned expired beacon {} from geo index", id);
                }
                Err(e) if e.is_not_found() => {
                    #[cfg(feature = "tracing-log")]
                    tracing::warn!("[beacon-storage] geo index lists missing beacon {}", id);
                    return Err(StorageError::corruption(format!(
                        "geo index lists {} {} with no record",
                        EntityKind::Beacon,
                        id
                    )));
                }
                Err(e) => return Err(e),
            }
        }

        Ok(beacons)
    }
}
