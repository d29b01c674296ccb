//! Compare sequential and parallel index construction on a synthetic batch.
//!
//! Run with: cargo run --example batch_build --features parallel --release

use std::time::Instant;

use trace_heatmap::{
    build_segment_index, build_segment_index_parallel, GpsPoint, IndexConfig, Trace,
};

fn synthetic_trace(id: i64, points: usize) -> Trace {
    // A wandering path seeded by the activity id so traces overlap but
    // are not identical
    let base_lat = 51.5 + (id % 10) as f64 * 0.001;
    let base_lng = -0.12 + (id % 7) as f64 * 0.001;

    let points = (0..points)
        .map(|i| {
            GpsPoint::new(
                base_lat + i as f64 * 0.0002,
                base_lng + ((i / 3) % 5) as f64 * 0.0001,
            )
        })
        .collect();

    Trace {
        activity_id: id,
        points,
    }
}

fn main() {
    let traces: Vec<Trace> = (0..500).map(|id| synthetic_trace(id, 2000)).collect();
    let config = IndexConfig::default();

    println!("Batch Build Example: {} traces x 2000 points\n", traces.len());

    let start = Instant::now();
    let sequential = build_segment_index(&traces, &config);
    let seq_elapsed = start.elapsed();
    println!(
        "  sequential: {} segments in {:?}",
        sequential.len(),
        seq_elapsed
    );

    let start = Instant::now();
    let parallel = build_segment_index_parallel(&traces, &config);
    let par_elapsed = start.elapsed();
    println!(
        "  parallel:   {} segments in {:?}",
        parallel.len(),
        par_elapsed
    );

    assert_eq!(sequential, parallel);
    println!("\n  outputs are value-identical");
}
