//! # Geodesy
//!
//! Great-circle distance on a spherical Earth and unit conversion.

use beacon_types::Geotag;

/// Mean Earth radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

pub const KM_TO_MILES: f64 = 0.621371;

pub fn to_radians(degrees: f64) -> f64 {
    degrees * std::f64::consts::PI / 180.0
}

/// Haversine distance between two geotags, in kilometers.
pub fn distance_km(a: &Geotag, b: &Geotag) -> f64 {
    let lat1 = to_radians(a.latitude);
    let lat2 = to_radians(b.latitude);
    let d_lat = lat2 - lat1;
    let d_lon = to_radians(b.longitude - a.longitude);

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    // Rounding can push h a hair outside [0, 1] for antipodal points.
    let h = h.clamp(0.0, 1.0);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    c * EARTH_RADIUS_KM
}

pub fn kilometers_to_miles(km: f64) -> f64 {
    km * KM_TO_MILES
}

pub fn miles_to_kilometers(miles: f64) -> f64 {
    miles / KM_TO_MILES
}

/// Finite and within [-90, 90] x [-180, 180].
pub fn is_valid(tag: &Geotag) -> bool {
    tag.latitude.is_finite()
        && tag.longitude.is_finite()
        && (-90.0..=90.0).contains(&tag.latitude)
        && (-180.0..=180.0).contains(&tag.longitude)
}

#[cfg(test)]
mod tests {
    use super::*;

    const LONDON: Geotag = Geotag::new(51.5074, -0.1278);
    const PARIS: Geotag = Geotag::new(48.8566, 2.3522);

    #[test]
    fn test_known_distance() {
        let d = distance_km(&LONDON, &PARIS);
        assert!((d - 343.5).abs() < 1.0, "London-Paris was {}", d);
    }

    #[test]
    fn test_distance_is_symmetric_and_zero_on_self() {
        assert_eq!(distance_km(&LONDON, &LONDON), 0.0);
        let ab = distance_km(&LONDON, &PARIS);
        let ba = distance_km(&PARIS, &LONDON);
        assert!((ab - ba).abs() < 1e-9);
    }

    #[test]
    fn test_antipodes_are_half_circumference() {
        let d = distance_km(&Geotag::new(0.0, 0.0), &Geotag::new(0.0, 180.0));
        let half = std::f64::consts::PI * EARTH_RADIUS_KM;
        assert!((d - half).abs() < 1e-6);
    }

    #[test]
    fn test_one_degree_of_longitude_shrinks_with_latitude() {
        let at_equator = distance_km(&Geotag::new(0.0, 0.0), &Geotag::new(0.0, 1.0));
        let at_sixty = distance_km(&Geotag::new(60.0, 0.0), &Geotag::new(60.0, 1.0));
        assert!((at_sixty / at_equator - 0.5).abs() < 0.01);
    }

    #[test]
    fn test_unit_conversion() {
        assert!((kilometers_to_miles(1.0) - 0.621371).abs() < 1e-12);
        assert!((miles_to_kilometers(kilometers_to_miles(42.0)) - 42.0).abs() < 1e-9);
    }

    #[test]
    fn test_validity() {
        assert!(is_valid(&Geotag::new(90.0, -180.0)));
        assert!(!is_valid(&Geotag::new(90.1, 0.0)));
        assert!(!is_valid(&Geotag::new(0.0, 180.5)));
        assert!(!is_valid(&Geotag::new(f64::NAN, 0.0)));
    }
}
