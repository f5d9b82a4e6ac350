//! # Radius Query Tests
//!
//! Beacons are scattered at known bearings and distances around a center;
//! a radius query must return exactly those within the great-circle
//! radius, nearest first.

#[cfg(test)]
mod tests {
    use beacon_storage::domain::geo;
    use beacon_storage::test_utils::{make_new_beacon, make_test_service, offset_by_km, ORIGIN};
    use beacon_storage::{BeaconStorageApi, StorageConfig, StorageError};
    use beacon_types::{Geotag, PostId};
    use rand::{Rng, SeedableRng};
    use std::collections::BTreeSet;

    use crate::init_tracing;

    /// Keep generated points this far (relative) from the query radius so
    /// the offset approximation cannot move a point across the boundary.
    const BOUNDARY_MARGIN: f64 = 0.02;

    fn scatter(rng: &mut impl Rng, count: usize, max_km: f64, radius_km: f64) -> Vec<Geotag> {
        let mut points = Vec::with_capacity(count);
        while points.len() < count {
            let distance = rng.gen_range(0.0..max_km);
            if (distance - radius_km).abs() < radius_km * BOUNDARY_MARGIN {
                continue;
            }
            let bearing = rng.gen_range(0.0..std::f64::consts::TAU);
            points.push(offset_by_km(
                ORIGIN,
                distance * bearing.cos(),
                distance * bearing.sin(),
            ));
        }
        points
    }

    #[test]
    fn test_radius_matches_great_circle_distance() {
        init_tracing();
        let mut rng = rand::rngs::StdRng::seed_from_u64(0x6265_6163);

        for radius_miles in [0.5, 2.0, 10.0, 40.0] {
            let (service, _clock) = make_test_service(StorageConfig::test());
            let radius_km = geo::miles_to_kilometers(radius_miles);
            let points = scatter(&mut rng, 60, radius_km * 2.5, radius_km);

            let mut expected = BTreeSet::new();
            for point in &points {
                let id = service.add_beacon(make_new_beacon(1, *point)).unwrap();
                if geo::distance_km(&ORIGIN, point) <= radius_km {
                    expected.insert(id);
                }
            }

            let found = service.beacons_within(ORIGIN, radius_miles).unwrap();
            let found_ids: BTreeSet<PostId> = found.iter().map(|b| b.id).collect();
            assert_eq!(found_ids, expected, "radius {} mi", radius_miles);
            assert_eq!(found.len(), found_ids.len());

            let distances: Vec<f64> = found
                .iter()
                .map(|b| geo::distance_km(&ORIGIN, &b.location))
                .collect();
            assert!(distances.windows(2).all(|w| w[0] <= w[1]));
        }
    }

    #[test]
    fn test_radius_excludes_comments_and_other_regions() {
        let (service, _clock) = make_test_service(StorageConfig::test());
        let near = service.add_beacon(make_new_beacon(1, ORIGIN)).unwrap();
        service
            .add_beacon(make_new_beacon(1, Geotag::new(-33.8688, 151.2093)))
            .unwrap();
        service
            .add_comment(beacon_storage::test_utils::make_new_comment(near, 2, "hi"))
            .unwrap();

        let found = service.beacons_within(ORIGIN, 100.0).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, near);
        // Radius results carry no comments.
        assert!(found[0].comments.is_empty());
    }

    #[test]
    fn test_radius_rejects_invalid_center() {
        let (service, _clock) = make_test_service(StorageConfig::test());
        assert!(matches!(
            service.beacons_within(Geotag::new(91.0, 0.0), 1.0),
            Err(StorageError::InvalidLocation { .. })
        ));
    }

    #[test]
    fn test_distance_conversions() {
        let km = geo::miles_to_kilometers(10.0);
        assert!((geo::kilometers_to_miles(km) - 10.0).abs() < 1e-9);
        assert!((km - 16.0934).abs() < 0.001);
    }
}
