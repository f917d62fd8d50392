// src/utils/geo.rs
use crate::models::trip::GeoPoint;

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance between two points in kilometers, via the
/// haversine formula. Pure; callers guarantee numeric inputs.
pub fn haversine_km(from: &GeoPoint, to: &GeoPoint) -> f64 {
    let lat1_rad = from.latitude.to_radians();
    let lat2_rad = to.latitude.to_radians();
    let delta_lat = (to.latitude - from.latitude).to_radians();
    let delta_lon = (to.longitude - from.longitude).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(latitude: f64, longitude: f64) -> GeoPoint {
        GeoPoint { latitude, longitude }
    }

    #[test]
    fn test_distance_to_self_is_zero() {
        let accra = point(5.6037, -0.1870);
        assert_eq!(haversine_km(&accra, &accra), 0.0);
    }

    #[test]
    fn test_distance_is_symmetric() {
        let a = point(5.6037, -0.1870);
        let b = point(6.6885, -1.6244);
        let forward = haversine_km(&a, &b);
        let backward = haversine_km(&b, &a);
        assert!((forward - backward).abs() < 1e-9);
    }

    #[test]
    fn test_one_degree_of_longitude_at_equator() {
        let d = haversine_km(&point(0.0, 0.0), &point(0.0, 1.0));
        // 2 * pi * 6371 / 360
        assert!((d - 111.19).abs() < 0.01, "got {}", d);
    }

    #[test]
    fn test_half_circumference() {
        let d = haversine_km(&point(0.0, 0.0), &point(0.0, 180.0));
        assert!((d - std::f64::consts::PI * 6371.0).abs() < 0.01, "got {}", d);
    }
}
