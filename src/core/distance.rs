use serde::{Deserialize, Serialize};

use crate::models::Coordinate;

/// Earth's radius in miles
const EARTH_RADIUS_MILES: f64 = 3958.8;

/// Upper bound of the walking tier, in miles
pub const WALKING_DISTANCE_MILES: f64 = 1.0;

/// Calculate the Haversine distance between two points in miles
///
/// # Arguments
/// * `lat1` - Latitude of first point in degrees
/// * `lon1` - Longitude of first point in degrees
/// * `lat2` - Latitude of second point in degrees
/// * `lon2` - Longitude of second point in degrees
///
/// # Returns
/// Unrounded distance in miles
#[inline]
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_MILES * c
}

/// Distance between two coordinates in miles, rounded to 2 decimal places
///
/// This is the value attached to pantries, so every comparison downstream
/// sees the same number the user does.
pub fn distance_miles(a: &Coordinate, b: &Coordinate) -> f64 {
    round_to_hundredths(haversine_distance(
        a.latitude,
        a.longitude,
        b.latitude,
        b.longitude,
    ))
}

#[inline]
pub fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Distance presets offered by clients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceTier {
    Walking,
    Biking,
    Driving,
}

impl DistanceTier {
    pub fn max_miles(self) -> f64 {
        match self {
            DistanceTier::Walking => WALKING_DISTANCE_MILES,
            DistanceTier::Biking => 3.0,
            DistanceTier::Driving => 10.0,
        }
    }
}
