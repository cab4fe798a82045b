use serde::{Deserialize, Serialize};

const EARTH_RADIUS_KM: f64 = 6371.0;

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Calculate distance between two coordinates using Haversine formula
/// Returns distance in kilometers
pub fn distance_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat1_rad = a.latitude.to_radians();
    let lat2_rad = b.latitude.to_radians();
    let delta_lat = (b.latitude - a.latitude).to_radians();
    let delta_lng = (b.longitude - a.longitude).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
    // Rounding can push h a hair above 1 for antipodal points
    let c = 2.0 * h.sqrt().min(1.0).asin();

    EARTH_RADIUS_KM * c
}

/// Check if a point is within `radius_km` of a center
pub fn is_within_radius(point: GeoPoint, center: GeoPoint, radius_km: f64) -> bool {
    distance_km(point, center) <= radius_km
}
