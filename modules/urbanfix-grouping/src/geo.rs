use std::f64::consts::PI;

use urbanfix_common::Location;

const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Haversine great-circle distance between two lat/lng points in meters.
pub fn haversine_distance_meters(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let to_rad = |deg: f64| deg * PI / 180.0;

    let dlat = to_rad(lat2 - lat1);
    let dlng = to_rad(lng2 - lng1);

    let a = (dlat / 2.0).sin().powi(2)
        + to_rad(lat1).cos() * to_rad(lat2).cos() * (dlng / 2.0).sin().powi(2);

    let c = 2.0 * a.sqrt().asin();
    EARTH_RADIUS_METERS * c
}

/// Distance in meters between two report locations.
pub fn distance_meters(a: &Location, b: &Location) -> f64 {
    haversine_distance_meters(a.lat, a.lng, b.lat, b.lng)
}
