//! # Geographic Utilities
//!
//! Core geographic computation utilities for GPS trace analysis.
//!
//! This module provides the distance primitives used by both index
//! construction and proximity queries. All functions are designed for GPS
//! trajectory data at interactive-map scales.
//!
//! ## Overview
//!
//! | Function | Description |
//! |----------|-------------|
//! | [`haversine_distance`] | Great-circle distance between two GPS points |
//! | [`point_to_segment_distance`] | Distance from a point to a segment, clamped to the segment |
//! | [`polyline_length`] | Total length of a GPS trace in meters |
//! | [`meters_to_degrees`] | Convert meters to approximate degrees at a latitude |
//!
//! ## Example
//!
//! ```rust
//! use trace_heatmap::{GpsPoint, geo_utils};
//!
//! let trace = vec![
//!     GpsPoint::new(51.5074, -0.1278),  // London
//!     GpsPoint::new(51.5080, -0.1290),
//!     GpsPoint::new(51.5090, -0.1300),
//! ];
//!
//! // Trace length
//! let length = geo_utils::polyline_length(&trace);
//! println!("Trace length: {:.0}m", length);
//!
//! // Distance between two points
//! let dist = geo_utils::haversine_distance(&trace[0], &trace[2]);
//! println!("Start to end: {:.0}m", dist);
//! ```
//!
//! ## Algorithm Notes
//!
//! ### Haversine Formula
//!
//! The haversine formula calculates the great-circle distance between two
//! points on a sphere (radius 6,371 km). Accurate to within 0.3% for most
//! practical applications.
//!
//! ### Point-to-Segment Distance
//!
//! [`point_to_segment_distance`] projects the point onto the local tangent
//! plane (equirectangular, scaled by the cosine of the mean latitude) and
//! measures to the nearest point ON the segment, not the infinite line.
//! The approximation holds for segments from city blocks up to tens of
//! kilometers; consecutive GPS fixes are meters to low-hundreds-of-meters
//! apart, well inside that range.
//!
//! ### Coordinate System
//!
//! All functions expect WGS84 coordinates (latitude/longitude in degrees),
//! the standard used by GPS receivers and mapping services.

use crate::GpsPoint;
use geo::{Distance, Haversine, Point};

/// Mean Earth radius in meters, shared by all spherical approximations.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

// =============================================================================
// Distance Functions
// =============================================================================

/// Calculate the great-circle distance between two GPS points using the
/// Haversine formula.
///
/// Returns the distance in meters along the Earth's surface. NaN
/// coordinates propagate NaN.
///
/// # Example
///
/// ```rust
/// use trace_heatmap::{GpsPoint, geo_utils};
///
/// let london = GpsPoint::new(51.5074, -0.1278);
/// let paris = GpsPoint::new(48.8566, 2.3522);
///
/// let distance = geo_utils::haversine_distance(&london, &paris);
/// assert!((distance - 343_560.0).abs() < 1000.0); // ~344 km
/// ```
#[inline]
pub fn haversine_distance(p1: &GpsPoint, p2: &GpsPoint) -> f64 {
    let point1 = Point::new(p1.longitude, p1.latitude);
    let point2 = Point::new(p2.longitude, p2.latitude);
    Haversine::distance(point1, point2)
}

/// Distance in meters from a point to the segment `a`-`b`, clamped to the
/// segment.
///
/// Projects `p` onto the segment in a local equirectangular plane scaled by
/// the cosine of the mean latitude of the three points, clamps the
/// projection parameter to `[0, 1]`, and returns the chord distance to the
/// projected point. The degenerate case `a == b` reduces to point distance.
///
/// Not valid for segments spanning large fractions of the globe.
///
/// # Example
///
/// ```rust
/// use trace_heatmap::{GpsPoint, geo_utils};
///
/// let a = GpsPoint::new(0.0, 0.0);
/// let b = GpsPoint::new(0.0, 0.001);
///
/// // A point on the segment is at distance ~0
/// let on = GpsPoint::new(0.0, 0.0005);
/// assert!(geo_utils::point_to_segment_distance(&on, &a, &b) < 1.0);
///
/// // A point past endpoint B is measured to B, not the infinite line
/// let past = GpsPoint::new(0.0, 0.002);
/// let d = geo_utils::point_to_segment_distance(&past, &a, &b);
/// assert!((d - geo_utils::haversine_distance(&past, &b)).abs() < 1.0);
/// ```
pub fn point_to_segment_distance(p: &GpsPoint, a: &GpsPoint, b: &GpsPoint) -> f64 {
    let ab_dist = haversine_distance(a, b);
    if ab_dist == 0.0 {
        return haversine_distance(p, a);
    }

    // Equirectangular projection around the mean latitude of the three points
    let lat_mean = ((a.latitude + b.latitude + p.latitude) / 3.0).to_radians();
    let cos_lat = lat_mean.cos();

    let xa = a.longitude.to_radians() * cos_lat;
    let ya = a.latitude.to_radians();
    let xb = b.longitude.to_radians() * cos_lat;
    let yb = b.latitude.to_radians();
    let xp = p.longitude.to_radians() * cos_lat;
    let yp = p.latitude.to_radians();

    let vx = xb - xa;
    let vy = yb - ya;
    let wx = xp - xa;
    let wy = yp - ya;

    // Projection parameter along the segment, clamped to the segment
    let t = ((vx * wx + vy * wy) / (vx * vx + vy * vy)).clamp(0.0, 1.0);

    let proj_x = xa + t * vx;
    let proj_y = ya + t * vy;

    let d_rad = ((proj_y - yp) * (proj_y - yp) + (proj_x - xp) * (proj_x - xp)).sqrt();
    d_rad * EARTH_RADIUS_METERS
}

/// Calculate the total length of a polyline (GPS trace) in meters.
///
/// Sums the haversine distance between consecutive points. Empty or
/// single-point traces return 0.0.
pub fn polyline_length(points: &[GpsPoint]) -> f64 {
    if points.len() < 2 {
        return 0.0;
    }

    points
        .windows(2)
        .map(|w| haversine_distance(&w[0], &w[1]))
        .sum()
}

/// Convert meters to approximate degrees at a given latitude.
///
/// At the equator, 1 degree is roughly 111,320 meters; the longitude span
/// shrinks with the cosine of latitude. Useful for sizing grid cells
/// against a query tolerance expressed in meters.
#[inline]
pub fn meters_to_degrees(meters: f64, latitude: f64) -> f64 {
    let lat_rad = latitude.to_radians();
    let meters_per_degree = 111_320.0 * lat_rad.cos().max(0.1);
    meters / meters_per_degree
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
        (a - b).abs() < epsilon
    }

    #[test]
    fn test_haversine_distance_same_point() {
        let p = GpsPoint::new(51.5074, -0.1278);
        assert_eq!(haversine_distance(&p, &p), 0.0);
    }

    #[test]
    fn test_haversine_distance_known_value() {
        // London to Paris is approximately 344 km
        let london = GpsPoint::new(51.5074, -0.1278);
        let paris = GpsPoint::new(48.8566, 2.3522);
        let dist = haversine_distance(&london, &paris);
        assert!(approx_eq(dist, 343_560.0, 5000.0)); // Within 5km
    }

    #[test]
    fn test_haversine_nan_propagates() {
        let p = GpsPoint::new(f64::NAN, 0.0);
        let q = GpsPoint::new(0.0, 0.0);
        assert!(haversine_distance(&p, &q).is_nan());
    }

    #[test]
    fn test_point_to_segment_on_segment() {
        let a = GpsPoint::new(0.0, 0.0);
        let b = GpsPoint::new(0.0, 0.001);
        let mid = GpsPoint::new(0.0, 0.0005);
        assert!(point_to_segment_distance(&mid, &a, &b) < 0.5);
    }

    #[test]
    fn test_point_to_segment_perpendicular() {
        // Point 0.001 degrees north of the segment midpoint: ~111m
        let a = GpsPoint::new(0.0, 0.0);
        let b = GpsPoint::new(0.0, 0.001);
        let p = GpsPoint::new(0.001, 0.0005);
        let d = point_to_segment_distance(&p, &a, &b);
        assert!(approx_eq(d, 111.0, 2.0));
    }

    #[test]
    fn test_point_to_segment_clamps_to_endpoint() {
        let a = GpsPoint::new(0.0, 0.0);
        let b = GpsPoint::new(0.0, 0.001);
        // Well past B along the line; nearest segment point is B itself
        let p = GpsPoint::new(0.0, 0.003);
        let d = point_to_segment_distance(&p, &a, &b);
        let to_b = haversine_distance(&p, &b);
        assert!(approx_eq(d, to_b, 1.0));
    }

    #[test]
    fn test_point_to_segment_degenerate() {
        let a = GpsPoint::new(51.5074, -0.1278);
        let p = GpsPoint::new(51.5080, -0.1278);
        let d = point_to_segment_distance(&p, &a, &a);
        assert!(approx_eq(d, haversine_distance(&p, &a), 0.001));
    }

    #[test]
    fn test_point_to_segment_nan_is_not_within_any_tolerance() {
        let a = GpsPoint::new(0.0, 0.0);
        let b = GpsPoint::new(0.0, 0.001);
        let p = GpsPoint::new(f64::NAN, 0.0);
        let d = point_to_segment_distance(&p, &a, &b);
        assert!(d.is_nan());
        // The tolerance comparison used by the query engine rejects NaN
        assert!(!(d <= 50.0));
    }

    #[test]
    fn test_polyline_length_empty() {
        let empty: Vec<GpsPoint> = vec![];
        assert_eq!(polyline_length(&empty), 0.0);
    }

    #[test]
    fn test_polyline_length_single_point() {
        let single = vec![GpsPoint::new(51.5074, -0.1278)];
        assert_eq!(polyline_length(&single), 0.0);
    }

    #[test]
    fn test_polyline_length_two_points() {
        let trace = vec![
            GpsPoint::new(51.5074, -0.1278),
            GpsPoint::new(51.5080, -0.1280),
        ];
        let length = polyline_length(&trace);
        assert!(length > 0.0);
        assert!(length < 100.0); // Should be about 68m
    }

    #[test]
    fn test_meters_to_degrees() {
        // At equator, 111km = 1 degree
        let deg = meters_to_degrees(111_320.0, 0.0);
        assert!(approx_eq(deg, 1.0, 0.01));

        // At higher latitude, same distance = more degrees
        let deg_45 = meters_to_degrees(111_320.0, 45.0);
        assert!(deg_45 > 1.0);
    }
}
