//! Proximity queries against a built segment index.
//!
//! Answers "which activities pass near this point" by scanning a bounded
//! neighborhood of grid cells around the query point and testing each
//! referenced segment against the tolerance. Cost is proportional to the
//! segments in that fixed neighborhood, not to the total index size.

use std::collections::HashSet;

use crate::geo_utils::point_to_segment_distance;
use crate::index::SegmentIndex;
use crate::GpsPoint;

/// Query with the standard one-cell search neighborhood.
///
/// Returns the unique ids of all activities whose path comes within
/// `tolerance_meters` of `point`; order is unspecified. An empty
/// neighborhood yields an empty vec, not an error.
///
/// Callers are expected to scale the tolerance with map zoom (a pixel
/// covers more ground when zoomed out); that mapping is caller policy.
///
/// # Example
///
/// ```rust
/// use trace_heatmap::{
///     build_segment_index, query_activities_at_point, GpsPoint, IndexConfig, Trace,
/// };
///
/// let traces = vec![Trace {
///     activity_id: 9,
///     points: vec![GpsPoint::new(0.0, 0.0), GpsPoint::new(0.0, 0.001)],
/// }];
/// let index = build_segment_index(&traces, &IndexConfig::default());
///
/// let hits = query_activities_at_point(&GpsPoint::new(0.0, 0.0), &index, 50.0);
/// assert_eq!(hits, vec![9]);
///
/// let misses = query_activities_at_point(&GpsPoint::new(10.0, 10.0), &index, 50.0);
/// assert!(misses.is_empty());
/// ```
pub fn query_activities_at_point(
    point: &GpsPoint,
    index: &SegmentIndex,
    tolerance_meters: f64,
) -> Vec<i64> {
    query_activities_at_point_with_radius(point, index, tolerance_meters, 1)
}

/// Query with an explicit Chebyshev cell radius.
///
/// Scans the `(2r + 1) x (2r + 1)` block of cells around the point's cell.
/// A tolerance larger than the span covered by the scanned neighborhood
/// can miss true positives near cell boundaries; widening
/// `search_radius_cells` is the supported way to trade cost for recall.
pub fn query_activities_at_point_with_radius(
    point: &GpsPoint,
    index: &SegmentIndex,
    tolerance_meters: f64,
    search_radius_cells: u32,
) -> Vec<i64> {
    // Same flooring as cell_key; computed numerically so neighbors can be
    // enumerated without string parsing
    let cx = (point.longitude / index.cell_size_degrees).floor() as i64;
    let cy = (point.latitude / index.cell_size_degrees).floor() as i64;
    let radius = search_radius_cells as i64;

    let mut hits: HashSet<i64> = HashSet::new();

    for dx in -radius..=radius {
        for dy in -radius..=radius {
            let cell = format!("{},{}", cx + dx, cy + dy);
            if let Some(ordinals) = index.grid.get(&cell) {
                for &ordinal in ordinals {
                    let seg = &index.segments[ordinal as usize];
                    let d = point_to_segment_distance(point, &seg.a, &seg.b);
                    // NaN fails this comparison, so malformed coordinates
                    // are simply never within tolerance
                    if d <= tolerance_meters {
                        hits.extend(seg.activity_ids.iter().copied());
                    }
                }
            }
        }
    }

    hits.into_iter().collect()
}

// =============================================================================
// Unit Tests
// =============================================================================
