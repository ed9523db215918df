//! Geographic value types and great-circle math.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Mean Earth radius in kilometers, used by the haversine distance.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A canonical latitude/longitude pair in degrees.
///
/// Values produced by the coordinate normalizer are always range-valid:
/// latitude in [-90, 90], longitude in [-180, 180].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    /// Create a new coordinate pair (degrees).
    pub fn new(lat: f64, lng: f64) -> Self {
        LatLng { lat, lng }
    }

    /// True when both axes lie inside their valid WGS84 degree ranges.
    pub fn is_valid(&self) -> bool {
        self.lat.abs() <= 90.0 && self.lng.abs() <= 180.0
    }
}

impl fmt::Display for LatLng {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}, {:.6}", self.lat, self.lng)
    }
}

/// Great-circle distance between two points in kilometers (haversine).
///
/// Symmetric in its arguments and zero for identical points.
pub fn haversine_km(a: LatLng, b: LatLng) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * c
}

/// Per-axis arithmetic midpoint of two points.
///
/// Not the geodesic midpoint; only used to place the distance label between
/// nearby points, where the difference is invisible.
pub fn midpoint(a: LatLng, b: LatLng) -> LatLng {
    LatLng::new((a.lat + b.lat) / 2.0, (a.lng + b.lng) / 2.0)
}

/// Deep link to an external directions service for the given destination.
pub fn directions_url(dest: LatLng) -> String {
    format!(
        "https://www.google.com/maps/dir/?api=1&destination={},{}",
        dest.lat, dest.lng
    )
}
