//! Simulate map click lookups against a built index.
//!
//! Run with: cargo run --example click_query

use trace_heatmap::{
    build_segment_index, geo_utils, query_activities_at_point,
    query_activities_at_point_with_radius, GpsPoint, IndexConfig, Trace,
};

fn main() {
    let traces = vec![
        Trace {
            activity_id: 1,
            points: vec![GpsPoint::new(0.0, 0.0), GpsPoint::new(0.0, 0.001)],
        },
        Trace {
            activity_id: 2,
            points: vec![GpsPoint::new(0.0, 0.001), GpsPoint::new(0.0, 0.002)],
        },
    ];

    let config = IndexConfig::default();
    let index = build_segment_index(&traces, &config);

    let cell_meters = config.cell_size_degrees * 111_320.0;
    println!("Click Query Example\n");
    println!(
        "Cell size: {} deg (~{:.0}m at the equator); a 50m tolerance sits well inside one cell\n",
        config.cell_size_degrees, cell_meters
    );

    let clicks = [
        ("on the shared corner", GpsPoint::new(0.0, 0.001)),
        ("just off the path", GpsPoint::new(0.0003, 0.0005)),
        ("far away", GpsPoint::new(10.0, 10.0)),
    ];

    for (label, point) in &clicks {
        let mut hits = query_activities_at_point(point, &index, 50.0);
        hits.sort_unstable();
        println!(
            "  click {} ({:.4}, {:.4}): {:?}",
            label, point.latitude, point.longitude, hits
        );
    }

    // Zoomed-out clicks need a larger tolerance; once it outgrows the
    // one-cell neighborhood, widen the scan radius with it
    let tolerance = 5000.0;
    let radius_cells =
        (geo_utils::meters_to_degrees(tolerance, 0.0) / config.cell_size_degrees).ceil() as u32;
    let mut hits = query_activities_at_point_with_radius(
        &GpsPoint::new(0.03, 0.0),
        &index,
        tolerance,
        radius_cells,
    );
    hits.sort_unstable();
    println!(
        "\n  wide click (tol {}m, radius {} cells): {:?}",
        tolerance, radius_cells, hits
    );
}
