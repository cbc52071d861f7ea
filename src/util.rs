//! Small shared helpers with no home of their own.

/// Canonical six-decimal coordinate cache key, e.g. `"32.896800_-97.038000"`.
///
/// The source this spec was distilled from defined four different helpers
/// for this; there is exactly one here, and every cache call site uses it.
pub fn coords_key(lat: f64, lng: f64) -> String {
    format!("{lat:.6}_{lng:.6}")
}

/// Great-circle distance between two coordinates, in meters (haversine).
pub fn haversine_meters(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    const EARTH_RADIUS_M: f64 = 6_371_000.0;
    let (lat1_r, lat2_r) = (lat1.to_radians(), lat2.to_radians());
    let dlat = (lat2 - lat1).to_radians();
    let dlng = (lng2 - lng1).to_radians();
    let a = (dlat / 2.0).sin().powi(2) + lat1_r.cos() * lat2_r.cos() * (dlng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_M * c
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coords_key_preserves_six_decimals() {
        assert_eq!(coords_key(32.8968, -97.038), "32.896800_-97.038000");
    }

    #[test]
    fn haversine_same_point_is_zero() {
        assert_eq!(haversine_meters(40.0, -73.0, 40.0, -73.0), 0.0);
    }

    #[test]
    fn haversine_known_distance_dallas_paris_is_large() {
        // Dallas-Fort Worth area to Paris region — cross-continental, > 1000 km.
        let d = haversine_meters(32.896800, -97.038000, 49.009700, 2.547900);
        assert!(d > 1_000_000.0);
    }
}
