//! Distance and travel-time estimation.
//!
//! Distances are great-circle (haversine) approximations, not road-network
//! paths. Travel time assumes a constant average speed.
//!
//! # Reference
//! Sinnott (1984), "Virtues of the Haversine", Sky and Telescope 68(2)

use serde::{Deserialize, Serialize};

/// Mean Earth radius (km).
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Default average travel speed (km/h).
pub const DEFAULT_SPEED_KMH: f64 = 40.0;

/// A geographic point in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Latitude (-90..=90).
    pub lat: f64,
    /// Longitude (-180..=180).
    pub lon: f64,
}

impl Location {
    /// Creates a location.
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Whether both coordinates are finite and within range.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }

    /// Great-circle distance to another location (km).
    #[inline]
    pub fn distance_km(&self, other: &Location) -> f64 {
        distance_km(self.lat, self.lon, other.lat, other.lon)
    }
}

/// Haversine distance between two points (km).
///
/// Never negative. Returns 0.0 if any coordinate is non-finite.
pub fn distance_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    if !(lat1.is_finite() && lon1.is_finite() && lat2.is_finite() && lon2.is_finite()) {
        return 0.0;
    }

    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let d_phi = (lat2 - lat1).to_radians();
    let d_lambda = (lon2 - lon1).to_radians();

    let a = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    // Rounding can push `a` marginally outside [0, 1] for antipodal points.
    let c = 2.0 * a.clamp(0.0, 1.0).sqrt().asin();

    EARTH_RADIUS_KM * c
}

/// Travel time for a distance at a constant speed (minutes).
///
/// Monotonically non-decreasing in `distance_km`. Negative or non-finite
/// distances and non-positive speeds yield 0.0.
pub fn travel_time_minutes(distance_km: f64, avg_speed_kmh: f64) -> f64 {
    if !distance_km.is_finite() || distance_km <= 0.0 {
        return 0.0;
    }
    if !avg_speed_kmh.is_finite() || avg_speed_kmh <= 0.0 {
        return 0.0;
    }
    distance_km / avg_speed_kmh * 60.0
}
