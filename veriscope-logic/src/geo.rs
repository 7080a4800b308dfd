//! Great-circle distance used by the port-call detector's geofence check.

const EARTH_RADIUS_KM: f64 = 6371.0088;

/// Haversine distance between two lat/lon points, in kilometers.
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let (lat1, lon1, lat2, lon2) = (
        lat1.to_radians(),
        lon1.to_radians(),
        lat2.to_radians(),
        lon2.to_radians(),
    );
    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;
    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();
    EARTH_RADIUS_KM * c
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_distance_for_identical_points() {
        assert!(haversine_km(51.9, 4.48, 51.9, 4.48) < 1e-9);
    }

    #[test]
    fn rotterdam_to_antwerp_is_roughly_right() {
        // Port of Rotterdam to Port of Antwerp, ~90km apart by air.
        let d = haversine_km(51.9225, 4.47917, 51.2993, 4.4014);
        assert!((60.0..=110.0).contains(&d), "got {d}");
    }
}
