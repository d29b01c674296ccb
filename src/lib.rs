//! # Trace Heatmap
//!
//! Segment-level GPS heatmap aggregation and proximity queries.
//!
//! This library ingests decoded GPS traces from many recorded activities
//! and builds a compact, queryable spatial structure:
//! - Repeated path segments are canonicalized and aggregated into a
//!   heatmap of traversal frequency
//! - "Which activities pass near this point" queries answer in
//!   near-constant time via a uniform degree-space grid
//! - Traversal counts normalize to colors through a constant catalog of
//!   gradient schemes
//!
//! Polyline decoding, remote activity fetching, activity filtering, and
//! rendering are collaborators outside this crate; the engine consumes
//! already-decoded point sequences and exposes data, not pixels.
//!
//! ## Features
//!
//! - **`parallel`** - Parallel batch index construction with rayon
//! - **`ffi`** - FFI bindings for mobile platforms (iOS/Android)
//! - **`full`** - Enable all features
//!
//! ## Quick Start
//!
//! ```rust
//! use trace_heatmap::{
//!     build_segment_index, color, query_activities_at_point, GpsPoint, IndexConfig, Trace,
//! };
//!
//! // Two activities covering the same stretch of road
//! let traces = vec![
//!     Trace {
//!         activity_id: 101,
//!         points: vec![GpsPoint::new(51.5074, -0.1278), GpsPoint::new(51.5080, -0.1290)],
//!     },
//!     Trace {
//!         activity_id: 102,
//!         points: vec![GpsPoint::new(51.5080, -0.1290), GpsPoint::new(51.5074, -0.1278)],
//!     },
//! ];
//!
//! let index = build_segment_index(&traces, &IndexConfig::default());
//! assert_eq!(index.len(), 1); // merged: same path, opposite directions
//!
//! // Click/tap lookup: who passes within 50m of this point?
//! let mut hits = query_activities_at_point(&GpsPoint::new(51.5074, -0.1278), &index, 50.0);
//! hits.sort_unstable();
//! assert_eq!(hits, vec![101, 102]);
//!
//! // Frequency -> color for rendering
//! let (min, max) = index.count_range();
//! let t = color::normalize_count(index.segments[0].count, min, max);
//! let hex = color::color_for(t, color::ColorScheme::Warm).to_hex();
//! assert!(hex.starts_with('#'));
//! ```

use serde::{Deserialize, Serialize};

// Geographic distance primitives
pub mod geo_utils;

// Segment canonicalization and trace decimation
pub mod segment;
pub use segment::{canonical_key, coord_key, decimate, quantize, Segment};

// Index construction and the spatial grid
pub mod index;
pub use index::{build_segment_index, cell_key, SegmentIndex};
#[cfg(feature = "parallel")]
pub use index::build_segment_index_parallel;

// Proximity queries
pub mod query;
pub use query::{query_activities_at_point, query_activities_at_point_with_radius};

// Frequency-to-color mapping
pub mod color;
pub use color::{color_for, normalize_count, Color, ColorScheme};

#[cfg(feature = "ffi")]
uniffi::setup_scaffolding!();

/// Initialize logging for Android (only used in FFI)
#[cfg(all(feature = "ffi", target_os = "android"))]
fn init_logging() {
    use android_logger::Config;
    use log::LevelFilter;

    android_logger::init_once(
        Config::default()
            .with_max_level(LevelFilter::Debug)
            .with_tag("TraceHeatmapRust"),
    );
}

#[cfg(all(feature = "ffi", not(target_os = "android")))]
fn init_logging() {
    // No-op on non-Android platforms
}

// ============================================================================
// Core Types
// ============================================================================

/// A GPS coordinate with latitude and longitude.
///
/// Serializes as a `[latitude, longitude]` pair, the shape produced by
/// polyline decoders and consumed by map layers.
///
/// # Example
/// ```
/// use trace_heatmap::GpsPoint;
/// let point = GpsPoint::new(51.5074, -0.1278); // London
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(into = "[f64; 2]", from = "[f64; 2]")]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct GpsPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GpsPoint {
    /// Create a new GPS point.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Check if the point has valid coordinates.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude >= -90.0
            && self.latitude <= 90.0
            && self.longitude >= -180.0
            && self.longitude <= 180.0
    }
}

impl From<[f64; 2]> for GpsPoint {
    fn from([latitude, longitude]: [f64; 2]) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

impl From<GpsPoint> for [f64; 2] {
    fn from(p: GpsPoint) -> Self {
        [p.latitude, p.longitude]
    }
}

/// One activity's decoded GPS trace.
///
/// Produced once per activity by the (external) polyline decoder and
/// consumed read-only by index construction. Traces with fewer than 2
/// points contribute no segments; that is not an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct Trace {
    /// Identifier of the owning activity
    pub activity_id: i64,
    /// Ordered decoded points
    pub points: Vec<GpsPoint>,
}

/// Configuration for index construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct IndexConfig {
    /// Decimal digits kept when quantizing coordinates for segment
    /// identity. Default: 5 (~1.1m at the equator)
    pub precision: u32,

    /// Grid cell size in degrees for spatial bucketing, shared by the
    /// build and query paths. Default: 0.02 (roughly 1-2km depending on
    /// latitude)
    pub cell_size_degrees: f64,

    /// Maximum points considered per trace; longer traces are decimated
    /// by uniform stride. The cap bounds segment count so one huge
    /// activity cannot degrade construction or query cost. Default: 500
    pub max_points_per_trace: u32,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            precision: 5,
            cell_size_degrees: 0.02,
            max_points_per_trace: 500,
        }
    }
}

// ============================================================================
// FFI Exports (only when feature enabled)
// ============================================================================

#[cfg(feature = "ffi")]
mod ffi {
    use super::*;
    use log::info;

    /// Build a segment index from decoded traces.
    #[uniffi::export]
    pub fn ffi_build_segment_index(traces: Vec<Trace>, config: IndexConfig) -> SegmentIndex {
        init_logging();
        info!(
            "[TraceHeatmapRust] build_segment_index called with {} traces",
            traces.len()
        );

        let start = std::time::Instant::now();

        #[cfg(feature = "parallel")]
        let index = build_segment_index_parallel(&traces, &config);

        #[cfg(not(feature = "parallel"))]
        let index = build_segment_index(&traces, &config);

        let elapsed = start.elapsed();
        info!(
            "[TraceHeatmapRust] Indexed {} segments in {} cells in {:?}",
            index.len(),
            index.grid.len(),
            elapsed
        );

        index
    }

    /// Input for flat buffer batch processing (zero-copy from host arrays)
    #[derive(Debug, Clone, uniffi::Record)]
    pub struct FlatTrace {
        pub activity_id: i64,
        /// Flat array of coordinates: [lat1, lng1, lat2, lng2, ...]
        pub coords: Vec<f64>,
    }

    /// Build a segment index from flat coordinate buffers.
    /// Each trace's coords array contains [lat1, lng1, lat2, lng2, ...].
    /// This avoids the overhead of deserializing GpsPoint objects.
    #[uniffi::export]
    pub fn ffi_build_segment_index_from_flat(
        traces: Vec<FlatTrace>,
        config: IndexConfig,
    ) -> SegmentIndex {
        init_logging();
        info!(
            "[TraceHeatmapRust] FLAT build_segment_index called with {} traces",
            traces.len()
        );

        let unpacked: Vec<Trace> = traces
            .into_iter()
            .map(|t| Trace {
                activity_id: t.activity_id,
                points: t
                    .coords
                    .chunks_exact(2)
                    .map(|chunk| GpsPoint::new(chunk[0], chunk[1]))
                    .collect(),
            })
            .collect();

        ffi_build_segment_index(unpacked, config)
    }

    /// Query the activities whose path comes within tolerance of a point.
    #[uniffi::export]
    pub fn ffi_query_activities_at_point(
        point: GpsPoint,
        index: &SegmentIndex,
        tolerance_meters: f64,
        search_radius_cells: u32,
    ) -> Vec<i64> {
        init_logging();
        let hits = query_activities_at_point_with_radius(
            &point,
            index,
            tolerance_meters,
            search_radius_cells,
        );
        info!(
            "[TraceHeatmapRust] query at ({:.5}, {:.5}) tol {}m -> {} activities",
            point.latitude,
            point.longitude,
            tolerance_meters,
            hits.len()
        );
        hits
    }

    /// Serialize an index to JSON for inspection or debugging overlays.
    #[uniffi::export]
    pub fn ffi_index_to_json(index: &SegmentIndex) -> String {
        serde_json::to_string(index).unwrap_or_default()
    }

    /// Resolve a segment's render color: normalize the traversal count
    /// over [min, max] and map it through the named scheme. Unknown
    /// scheme names fall back to "warm".
    #[uniffi::export]
    pub fn ffi_segment_color(count: u32, min: u32, max: u32, scheme: String) -> String {
        let t = normalize_count(count, min, max);
        color_for(t, ColorScheme::from_name(&scheme)).to_hex()
    }

    /// List the available color scheme names, in catalog order.
    #[uniffi::export]
    pub fn ffi_color_scheme_names() -> Vec<String> {
        ColorScheme::all()
            .iter()
            .map(|s| s.as_str().to_string())
            .collect()
    }

    /// Get default configuration.
    #[uniffi::export]
    pub fn default_index_config() -> IndexConfig {
        IndexConfig::default()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gps_point_validation() {
        assert!(GpsPoint::new(51.5074, -0.1278).is_valid());
        assert!(!GpsPoint::new(91.0, 0.0).is_valid());
        assert!(!GpsPoint::new(0.0, 181.0).is_valid());
        assert!(!GpsPoint::new(f64::NAN, 0.0).is_valid());
        assert!(!GpsPoint::new(f64::INFINITY, 0.0).is_valid());
    }

    #[test]
    fn test_gps_point_serializes_as_pair() {
        let p = GpsPoint::new(51.5074, -0.1278);
        let json = serde_json::to_string(&p).unwrap();
        assert_eq!(json, "[51.5074,-0.1278]");

        let back: GpsPoint = serde_json::from_str(&json).unwrap();
        assert_eq!(back, p);
    }

    #[test]
    fn test_trace_deserializes_from_contract_shape() {
        let json = r#"{"activityId": 42, "points": [[0.0, 0.0], [0.0, 0.001]]}"#;
        let trace: Trace = serde_json::from_str(json).unwrap();
        assert_eq!(trace.activity_id, 42);
        assert_eq!(trace.points.len(), 2);
        assert_eq!(trace.points[1].longitude, 0.001);
    }

    #[test]
    fn test_default_config() {
        let config = IndexConfig::default();
        assert_eq!(config.precision, 5);
        assert_eq!(config.cell_size_degrees, 0.02);
        assert_eq!(config.max_points_per_trace, 500);
    }
}
