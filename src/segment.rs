//! Segment canonicalization and trace decimation.
//!
//! A segment is an undirected edge between two adjacent (quantized) GPS
//! points. Quantization absorbs floating-point and GPS jitter so the same
//! physical stretch of path recorded by different activities collapses to
//! one identity; the canonical key makes that identity independent of
//! travel direction.
//!
//! The key format is deliberately explicit: coordinates are quantized
//! first, then rendered with fixed decimal places, so the exact same
//! string is produced by the build and query paths regardless of how the
//! raw floats were obtained.

use crate::GpsPoint;
use serde::{Deserialize, Serialize};

/// An undirected, canonicalized edge aggregated across all traces.
///
/// Endpoints are the QUANTIZED endpoints, so repeated contributions from
/// different activities render at the same location. `activity_ids`
/// behaves as a set in first-contribution order; `count` tallies every
/// traversal, including repeat passes by the same activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct Segment {
    /// Canonical undirected key, also the segment's identity
    pub id: String,
    /// First quantized endpoint
    pub a: GpsPoint,
    /// Second quantized endpoint
    pub b: GpsPoint,
    /// Number of (activity, adjacent-pair) traversals
    pub count: u32,
    /// Contributing activities, deduplicated, in first-contribution order
    pub activity_ids: Vec<i64>,
}

impl Segment {
    /// Geometric midpoint of the two endpoints, used for grid bucketing.
    pub fn midpoint(&self) -> GpsPoint {
        GpsPoint::new(
            (self.a.latitude + self.b.latitude) / 2.0,
            (self.a.longitude + self.b.longitude) / 2.0,
        )
    }
}

// =============================================================================
// Quantization and Keys
// =============================================================================

/// Round both coordinates to `precision` decimal digits.
///
/// The default precision of 5 corresponds to roughly 1.1 m at the equator,
/// enough to absorb GPS jitter between recordings of the same path.
///
/// # Example
///
/// ```rust
/// use trace_heatmap::{GpsPoint, segment::quantize};
///
/// let p = quantize(&GpsPoint::new(51.507412349, -0.127801251), 5);
/// assert_eq!(p.latitude, 51.50741);
/// assert_eq!(p.longitude, -0.12780);
/// ```
pub fn quantize(p: &GpsPoint, precision: u32) -> GpsPoint {
    let factor = 10f64.powi(precision as i32);
    GpsPoint::new(
        (p.latitude * factor).round() / factor,
        (p.longitude * factor).round() / factor,
    )
}

/// Fixed-decimal `"lat|lng"` rendering of the quantized point.
///
/// This is the single coordinate key format shared by every path that
/// needs a map key derived from a point. The point is quantized before
/// formatting so the stored endpoint and the key always agree.
pub fn coord_key(p: &GpsPoint, precision: u32) -> String {
    let q = quantize(p, precision);
    let prec = precision as usize;
    format!("{:.prec$}|{:.prec$}", q.latitude, q.longitude)
}

/// Order-invariant identity key for the segment `a`-`b`.
///
/// Builds `"qa/qb"` and `"qb/qa"` from the quantized endpoint keys and
/// returns the lexicographically smaller one, so walking a path in either
/// direction yields the same key.
///
/// # Example
///
/// ```rust
/// use trace_heatmap::{GpsPoint, segment::canonical_key};
///
/// let a = GpsPoint::new(51.5074, -0.1278);
/// let b = GpsPoint::new(51.5080, -0.1290);
/// assert_eq!(canonical_key(&a, &b, 5), canonical_key(&b, &a, 5));
/// ```
pub fn canonical_key(a: &GpsPoint, b: &GpsPoint, precision: u32) -> String {
    let qa = coord_key(a, precision);
    let qb = coord_key(b, precision);
    if qa < qb {
        format!("{}/{}", qa, qb)
    } else {
        format!("{}/{}", qb, qa)
    }
}

// =============================================================================
// Decimation
// =============================================================================

/// Cap the number of points in a trace by uniform stride subsampling.
///
/// Traces at or under the cap are returned unchanged. Longer traces are
/// sampled at a fixed stride of `ceil(len / max_points)` starting from
/// index 0, preserving order; the first point is always kept. A cap of 0
/// disables decimation.
///
/// Whenever the input has at least 2 points and `max_points >= 2`, the
/// result has at least 2 points, so the trace still contributes segments.
///
/// # Example
///
/// ```rust
/// use trace_heatmap::{GpsPoint, segment::decimate};
///
/// let points: Vec<GpsPoint> = (0..10)
///     .map(|i| GpsPoint::new(i as f64 * 0.001, 0.0))
///     .collect();
///
/// // Stride ceil(10/3) = 4 keeps indices 0, 4, 8
/// let kept = decimate(&points, 3);
/// assert_eq!(kept.len(), 3);
/// assert_eq!(kept[0], points[0]);
/// assert_eq!(kept[1], points[4]);
/// assert_eq!(kept[2], points[8]);
/// ```
pub fn decimate(points: &[GpsPoint], max_points: u32) -> Vec<GpsPoint> {
    let max = max_points as usize;
    if max == 0 || points.len() <= max {
        return points.to_vec();
    }

    let stride = points.len().div_ceil(max);
    points.iter().copied().step_by(stride).collect()
}

// =============================================================================
// Unit Tests
// =============================================================================
