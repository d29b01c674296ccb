//! Segment index construction.
//!
//! Consumes decimated point sequences from all selected activities and
//! produces a deduplicated collection of segments, each carrying a
//! traversal count and the contributing activity ids, bucketed into a
//! fixed-size geographic grid for fast proximity lookup.
//!
//! The whole pipeline is a pure function of its inputs: the same traces
//! and configuration always yield the same index. Segments are kept in
//! first-occurrence order, so repeated builds compare equal value-by-value.
//! The index is rebuilt wholesale whenever its inputs change; there is no
//! incremental update and no persistent segment identity across builds.

use std::collections::HashMap;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::segment::{canonical_key, decimate, quantize, Segment};
use crate::{GpsPoint, IndexConfig, Trace};

/// The aggregate result of a build: deduplicated segments plus a uniform
/// degree-space grid mapping cell keys to segment ordinals.
///
/// Every segment appears in exactly one grid bucket, the cell containing
/// its geometric midpoint. The index is immutable once returned and is
/// discarded and replaced wholesale when inputs change. Serializes to the
/// shape consumed by inspection tooling and tests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct SegmentIndex {
    /// Deduplicated segments in first-occurrence order
    pub segments: Vec<Segment>,
    /// Cell key `"x,y"` to ordinals into `segments`
    pub grid: HashMap<String, Vec<u32>>,
    /// Cell size used for bucketing, shared with the query path
    pub cell_size_degrees: f64,
}

impl SegmentIndex {
    /// Number of distinct segments in the index.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Check if the index holds no segments.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Minimum and maximum traversal counts across all segments, the
    /// inputs to count normalization. Returns `(0, 0)` for an empty index.
    pub fn count_range(&self) -> (u32, u32) {
        let mut counts = self.segments.iter().map(|s| s.count);
        match counts.next() {
            None => (0, 0),
            Some(first) => counts.fold((first, first), |(lo, hi), c| (lo.min(c), hi.max(c))),
        }
    }
}

/// Grid cell key for a point: `"x,y"` with `x = floor(lng / cell_size)`
/// and `y = floor(lat / cell_size)`.
///
/// The one flooring formula shared by index build and query; the two paths
/// must agree or neighborhood scans would look in the wrong buckets.
pub fn cell_key(p: &GpsPoint, cell_size_degrees: f64) -> String {
    let x = (p.longitude / cell_size_degrees).floor() as i64;
    let y = (p.latitude / cell_size_degrees).floor() as i64;
    format!("{},{}", x, y)
}

// Accumulates segments during a build. Keeps first-occurrence order in a
// Vec with a key-to-ordinal map alongside, so output is deterministic.
struct IndexBuilder {
    precision: u32,
    max_points_per_trace: u32,
    segments: Vec<Segment>,
    ordinals: HashMap<String, usize>,
}

impl IndexBuilder {
    fn new(config: &IndexConfig) -> Self {
        Self {
            precision: config.precision,
            max_points_per_trace: config.max_points_per_trace,
            segments: Vec::new(),
            ordinals: HashMap::new(),
        }
    }

    fn add_trace(&mut self, trace: &Trace) {
        // 0- or 1-point traces contribute nothing; not an error
        if trace.points.len() < 2 {
            return;
        }

        let points = decimate(&trace.points, self.max_points_per_trace);
        for pair in points.windows(2) {
            let key = canonical_key(&pair[0], &pair[1], self.precision);
            let qa = quantize(&pair[0], self.precision);
            let qb = quantize(&pair[1], self.precision);
            self.add_pair(trace.activity_id, key, qa, qb);
        }
    }

    fn add_pair(&mut self, activity_id: i64, key: String, qa: GpsPoint, qb: GpsPoint) {
        let ordinal = match self.ordinals.get(&key) {
            Some(&i) => i,
            None => {
                let i = self.segments.len();
                self.segments.push(Segment {
                    id: key.clone(),
                    a: qa,
                    b: qb,
                    count: 0,
                    activity_ids: Vec::new(),
                });
                self.ordinals.insert(key, i);
                i
            }
        };

        let seg = &mut self.segments[ordinal];
        seg.count += 1;
        if !seg.activity_ids.contains(&activity_id) {
            seg.activity_ids.push(activity_id);
        }
    }

    fn build(self, cell_size_degrees: f64) -> SegmentIndex {
        let mut grid: HashMap<String, Vec<u32>> = HashMap::new();

        for (ordinal, seg) in self.segments.iter().enumerate() {
            let cell = cell_key(&seg.midpoint(), cell_size_degrees);
            grid.entry(cell).or_default().push(ordinal as u32);
        }

        SegmentIndex {
            segments: self.segments,
            grid,
            cell_size_degrees,
        }
    }
}

/// Build a segment index from all selected traces.
///
/// Each trace is decimated, then every adjacent point pair is
/// canonicalized and merged into its segment: the count is incremented and
/// the activity id recorded once. Segments store their quantized
/// endpoints. Finally every segment is assigned to the grid cell
/// containing its midpoint.
///
/// Empty input produces an empty index, not an error.
///
/// # Example
///
/// ```rust
/// use trace_heatmap::{build_segment_index, GpsPoint, IndexConfig, Trace};
///
/// let traces = vec![
///     Trace {
///         activity_id: 101,
///         points: vec![GpsPoint::new(0.0, 0.0), GpsPoint::new(0.0, 0.001)],
///     },
///     Trace {
///         activity_id: 102,
///         points: vec![GpsPoint::new(0.0, 0.001), GpsPoint::new(0.0, 0.0)],
///     },
/// ];
///
/// let index = build_segment_index(&traces, &IndexConfig::default());
/// assert_eq!(index.len(), 1); // same path, either direction
/// assert_eq!(index.segments[0].count, 2);
/// ```
pub fn build_segment_index(traces: &[Trace], config: &IndexConfig) -> SegmentIndex {
    let mut builder = IndexBuilder::new(config);
    for trace in traces {
        builder.add_trace(trace);
    }

    let index = builder.build(config.cell_size_degrees);
    debug!(
        "built segment index: {} traces -> {} segments in {} cells",
        traces.len(),
        index.segments.len(),
        index.grid.len()
    );
    index
}

/// Build a segment index using parallel per-trace extraction.
///
/// Decimation, quantization, and key derivation fan out across traces with
/// rayon; the merge runs sequentially in trace order, so the output is
/// value-identical to [`build_segment_index`]. Worthwhile for batch loads
/// of hundreds of traces.
#[cfg(feature = "parallel")]
pub fn build_segment_index_parallel(traces: &[Trace], config: &IndexConfig) -> SegmentIndex {
    use rayon::prelude::*;

    let precision = config.precision;
    let max_points = config.max_points_per_trace;

    let extracted: Vec<(i64, Vec<(String, GpsPoint, GpsPoint)>)> = traces
        .par_iter()
        .map(|trace| {
            if trace.points.len() < 2 {
                return (trace.activity_id, Vec::new());
            }
            let points = decimate(&trace.points, max_points);
            let pairs = points
                .windows(2)
                .map(|pair| {
                    (
                        canonical_key(&pair[0], &pair[1], precision),
                        quantize(&pair[0], precision),
                        quantize(&pair[1], precision),
                    )
                })
                .collect();
            (trace.activity_id, pairs)
        })
        .collect();

    let mut builder = IndexBuilder::new(config);
    for (activity_id, pairs) in extracted {
        for (key, qa, qb) in pairs {
            builder.add_pair(activity_id, key, qa, qb);
        }
    }

    let index = builder.build(config.cell_size_degrees);
    debug!(
        "built segment index (parallel): {} traces -> {} segments in {} cells",
        traces.len(),
        index.segments.len(),
        index.grid.len()
    );
    index
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn trace(id: i64, points: &[(f64, f64)]) -> Trace {
        Trace {
            activity_id: id,
            points: points
                .iter()
                .map(|&(lat, lng)| GpsPoint::new(lat, lng))
                .collect(),
        }
    }

    #[test]
    fn test_empty_input_empty_index() {
        let index = build_segment_index(&[], &IndexConfig::default());
        assert!(index.is_empty());
        assert!(index.grid.is_empty());
        assert_eq!(index.count_range(), (0, 0));
    }

    #[test]
    fn test_short_traces_ignored() {
        let traces = vec![trace(1, &[]), trace(2, &[(0.0, 0.0)])];
        let index = build_segment_index(&traces, &IndexConfig::default());
        assert!(index.is_empty());
    }

    #[test]
    fn test_single_trace_segments() {
        let traces = vec![trace(1, &[(0.0, 0.0), (0.0, 0.001), (0.0, 0.002)])];
        let index = build_segment_index(&traces, &IndexConfig::default());
        assert_eq!(index.len(), 2);
        for seg in &index.segments {
            assert_eq!(seg.count, 1);
            assert_eq!(seg.activity_ids, vec![1]);
        }
    }

    #[test]
    fn test_opposite_directions_merge() {
        let traces = vec![
            trace(1, &[(0.0, 0.0), (0.0, 0.001)]),
            trace(2, &[(0.0, 0.001), (0.0, 0.0)]),
        ];
        let index = build_segment_index(&traces, &IndexConfig::default());
        assert_eq!(index.len(), 1);
        assert_eq!(index.segments[0].count, 2);
        assert_eq!(index.segments[0].activity_ids, vec![1, 2]);
    }

    #[test]
    fn test_jittered_recordings_merge_at_coarse_precision() {
        // Activity 2 retraces activity 1's stretch with GPS jitter; at
        // precision 3 both pairs quantize to the same rounded points and
        // collapse to one key
        let traces = vec![
            trace(1, &[(0.0, 0.0), (0.0, 0.001)]),
            trace(2, &[(0.0, 0.0011), (0.0, 0.0002)]),
        ];
        let config = IndexConfig {
            precision: 3,
            ..IndexConfig::default()
        };
        let index = build_segment_index(&traces, &config);
        assert_eq!(index.len(), 1);
        assert_eq!(index.segments[0].count, 2);
        assert_eq!(index.segments[0].activity_ids, vec![1, 2]);
    }

    #[test]
    fn test_revisited_segment_counts_twice_credits_once() {
        // Out and back along the same block: the pair occurs twice within
        // one activity
        let traces = vec![trace(7, &[(0.0, 0.0), (0.0, 0.001), (0.0, 0.0)])];
        let index = build_segment_index(&traces, &IndexConfig::default());
        assert_eq!(index.len(), 1);
        assert_eq!(index.segments[0].count, 2);
        assert_eq!(index.segments[0].activity_ids, vec![7]);
    }

    #[test]
    fn test_segments_store_quantized_endpoints() {
        let traces = vec![trace(1, &[(0.000001, 0.0), (0.000001, 0.001)])];
        let index = build_segment_index(&traces, &IndexConfig::default());
        let seg = &index.segments[0];
        assert_eq!(seg.a.latitude, 0.0);
        assert_eq!(seg.b.latitude, 0.0);
    }

    #[test]
    fn test_every_segment_in_exactly_one_cell() {
        let traces = vec![
            trace(1, &[(0.0, 0.0), (0.05, 0.05), (0.1, 0.1)]),
            trace(2, &[(40.0, -74.0), (40.001, -74.001)]),
        ];
        let index = build_segment_index(&traces, &IndexConfig::default());
        let bucketed: usize = index.grid.values().map(|v| v.len()).sum();
        assert_eq!(bucketed, index.len());

        for (cell, ordinals) in &index.grid {
            for &ordinal in ordinals {
                let mid = index.segments[ordinal as usize].midpoint();
                assert_eq!(&cell_key(&mid, index.cell_size_degrees), cell);
            }
        }
    }

    #[test]
    fn test_build_is_idempotent() {
        let traces = vec![
            trace(1, &[(51.5074, -0.1278), (51.5080, -0.1290), (51.5090, -0.1300)]),
            trace(2, &[(51.5090, -0.1300), (51.5080, -0.1290)]),
            trace(3, &[(40.7128, -74.0060), (40.7138, -74.0070)]),
        ];
        let config = IndexConfig::default();
        let first = build_segment_index(&traces, &config);
        let second = build_segment_index(&traces, &config);
        assert_eq!(first, second);
    }

    #[test]
    fn test_count_monotonicity_when_adding_trace() {
        let mut traces = vec![
            trace(1, &[(0.0, 0.0), (0.0, 0.001), (0.0, 0.002)]),
            trace(2, &[(0.0, 0.001), (0.0, 0.002)]),
        ];
        let config = IndexConfig::default();
        let before = build_segment_index(&traces, &config);

        traces.push(trace(3, &[(0.0, 0.0), (0.0, 0.001)]));
        let after = build_segment_index(&traces, &config);

        for seg in &before.segments {
            let updated = after
                .segments
                .iter()
                .find(|s| s.id == seg.id)
                .expect("segment disappeared after adding a trace");
            assert!(updated.count >= seg.count);
        }
    }

    #[test]
    fn test_decimation_caps_segment_count() {
        let points: Vec<(f64, f64)> = (0..1000).map(|i| (i as f64 * 0.0001, 0.0)).collect();
        let config = IndexConfig {
            max_points_per_trace: 10,
            ..IndexConfig::default()
        };
        let index = build_segment_index(&[trace(1, &points)], &config);
        assert!(index.len() <= 9);
        assert!(!index.is_empty());
    }

    #[test]
    fn test_count_range() {
        let traces = vec![
            trace(1, &[(0.0, 0.0), (0.0, 0.001), (0.0, 0.002)]),
            trace(2, &[(0.0, 0.0), (0.0, 0.001)]),
        ];
        let index = build_segment_index(&traces, &IndexConfig::default());
        assert_eq!(index.count_range(), (1, 2));
    }

    #[test]
    fn test_index_serializes_to_contract_shape() {
        let traces = vec![trace(42, &[(0.0, 0.0), (0.0, 0.001)])];
        let index = build_segment_index(&traces, &IndexConfig::default());

        let json = serde_json::to_value(&index).unwrap();
        assert_eq!(json["cellSizeDegrees"], 0.02);
        let seg = &json["segments"][0];
        assert_eq!(seg["count"], 1);
        assert_eq!(seg["activityIds"][0], 42);
        assert_eq!(seg["a"][0], 0.0); // [lat, lng] pair
        assert!(seg["id"].is_string());

        let back: SegmentIndex = serde_json::from_value(json).unwrap();
        assert_eq!(back, index);
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_parallel_build_matches_sequential() {
        let traces: Vec<Trace> = (0..50)
            .map(|i| {
                trace(
                    i,
                    &[
                        (i as f64 * 0.0001, 0.0),
                        (0.001, 0.001),
                        (0.002, 0.002),
                    ],
                )
            })
            .collect();
        let config = IndexConfig::default();
        assert_eq!(
            build_segment_index(&traces, &config),
            build_segment_index_parallel(&traces, &config)
        );
    }
}
