//! Ring-of-points generation for wide-area coverage.

use crate::models::Coordinate;

/// Earth radius used for destination-point math, in meters (WGS-84 equatorial).
pub const EARTH_RADIUS_METERS: f64 = 6_378_137.0;

/// Generate `points` coordinates at great-circle distance `radius_m` from
/// `(lat, lon)`, with bearings spaced evenly by `360 / points` degrees
/// starting due north.
pub fn generate_grid(lat: f64, lon: f64, radius_m: f64, points: usize) -> Vec<Coordinate> {
    let angular = radius_m / EARTH_RADIUS_METERS;
    let lat1 = lat.to_radians();
    let lon1 = lon.to_radians();

    (0..points)
        .map(|i| {
            let bearing = 2.0 * std::f64::consts::PI * i as f64 / points as f64;
            let lat2 = (lat1.sin() * angular.cos() + lat1.cos() * angular.sin() * bearing.cos())
                .asin();
            let lon2 = lon1
                + (bearing.sin() * angular.sin() * lat1.cos())
                    .atan2(angular.cos() - lat1.sin() * lat2.sin());
            Coordinate::new(lat2.to_degrees(), lon2.to_degrees())
        })
        .collect()
}

/// Great-circle distance between two coordinates, in meters (haversine).
pub fn distance_meters(a: &Coordinate, b: &Coordinate) -> f64 {
    let dlat = (b.lat - a.lat).to_radians();
    let dlon = (b.lon - a.lon).to_radians();
    let h = (dlat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_METERS * h.sqrt().asin()
}

/// Initial bearing from `a` to `b`, in degrees within `[0, 360)`.
pub fn bearing_degrees(a: &Coordinate, b: &Coordinate) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let dlon = (b.lon - a.lon).to_radians();
    let y = dlon.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * dlon.cos();
    (y.atan2(x).to_degrees() + 360.0) % 360.0
}
