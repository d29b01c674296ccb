//! Build a segment heatmap index from sample activities.
//!
//! Run with: cargo run --example build_heatmap

use trace_heatmap::{
    build_segment_index, color_for, geo_utils, normalize_count, ColorScheme, GpsPoint,
    IndexConfig, Trace,
};

fn main() {
    // Three sample activities (London area). Two of them share the same
    // stretch of road, one walks it in reverse.
    let shared_road = vec![
        GpsPoint::new(51.5074, -0.1278),
        GpsPoint::new(51.5080, -0.1290),
        GpsPoint::new(51.5090, -0.1300),
    ];

    let mut reversed = shared_road.clone();
    reversed.reverse();

    let mut detour = shared_road.clone();
    detour.push(GpsPoint::new(51.5100, -0.1310));

    let traces = vec![
        Trace { activity_id: 101, points: shared_road.clone() },
        Trace { activity_id: 102, points: reversed },
        Trace { activity_id: 103, points: detour },
    ];

    let config = IndexConfig::default();

    println!("Segment Heatmap Example\n");
    println!(
        "Config: precision={}, cell_size={} deg, max_points_per_trace={}\n",
        config.precision, config.cell_size_degrees, config.max_points_per_trace
    );

    for trace in &traces {
        println!(
            "  activity {}: {} points, {:.0}m",
            trace.activity_id,
            trace.points.len(),
            geo_utils::polyline_length(&trace.points)
        );
    }

    let index = build_segment_index(&traces, &config);
    let (min, max) = index.count_range();

    println!(
        "\nIndex: {} segments in {} grid cells (counts {}..{})\n",
        index.len(),
        index.grid.len(),
        min,
        max
    );

    for segment in &index.segments {
        let t = normalize_count(segment.count, min, max);
        let color = color_for(t, ColorScheme::Warm);
        println!(
            "  {} | count={} activities={:?} color={}",
            segment.id,
            segment.count,
            segment.activity_ids,
            color.to_hex()
        );
    }

    println!("\nSerialized index:");
    match serde_json::to_string_pretty(&index) {
        Ok(json) => println!("{}", json),
        Err(e) => println!("  serialization failed: {}", e),
    }
}
