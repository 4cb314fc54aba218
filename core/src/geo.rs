// core/src/geo.rs
use crate::models::Point;

pub const EARTH_RADIUS_M: f64 = 6_371_000.0; // spherical Earth (m)
pub const MAX_SLOPE: f64 = 0.4;             // ±40 %

/// Great-circle distance (m) between two lat/lon pairs in degrees.
/// NaN in, NaN out.
pub fn haversine_m(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let d_phi = (lat2 - lat1).to_radians();
    let d_lambda = (lon2 - lon1).to_radians();

    let a = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_M * c
}

/// Horizontal distance between two points (m).
#[inline]
pub fn distance(a: &Point, b: &Point) -> f64 {
    haversine_m(a.lat, a.lon, b.lat, b.lon)
}

/// Distance including the vertical component when both elevations exist.
pub fn distance_3d(a: &Point, b: &Point) -> f64 {
    let horizontal = distance(a, b);
    match (a.elevation, b.elevation) {
        (Some(e1), Some(e2)) => horizontal.hypot(e2 - e1),
        _ => horizontal,
    }
}

/// Slope ratio (0.25 = 25 %) from `a` to `b`, clamped to ±MAX_SLOPE.
/// 0 when an elevation is missing or the points coincide.
pub fn slope(a: &Point, b: &Point) -> f64 {
    let (Some(e1), Some(e2)) = (a.elevation, b.elevation) else {
        return 0.0;
    };
    let horizontal = distance(a, b);
    if horizontal == 0.0 {
        return 0.0;
    }
    ((e2 - e1) / horizontal).clamp(-MAX_SLOPE, MAX_SLOPE)
}
