//! Performance benchmarks for roadnet
//!
//! Run with: cargo bench
//!
//! The workload is a synthetic grid city: streets every 100 units in both
//! directions, chopped into one segment per block, with every tenth street
//! promoted to a primary road.

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use geo::{Coord, Rect};
use roadnet::{Point, RoadAtlas, RoadClass, Segment};

const BLOCK: f64 = 100.0;

/// Generate a `size` x `size` grid of street blocks. Vertices are numbered
/// row-major; horizontal streets are named per row, vertical per column.
fn generate_grid(size: usize) -> (Vec<Segment>, usize) {
    let vertex = |col: usize, row: usize| col + row * size;
    let point = |col: usize, row: usize| {
        Point::with_id(vertex(col, row), col as f64 * BLOCK, row as f64 * BLOCK)
    };
    let class = |index: usize| {
        if index % 10 == 0 {
            RoadClass::Primary
        } else {
            RoadClass::Road
        }
    };

    let mut segments = Vec::new();
    for row in 0..size {
        for col in 0..size - 1 {
            segments.push(Segment::bidirectional(
                point(col, row),
                point(col + 1, row),
                format!("Street {row}"),
                class(row),
            ));
        }
    }
    for col in 0..size {
        for row in 0..size - 1 {
            segments.push(Segment::bidirectional(
                point(col, row),
                point(col, row + 1),
                format!("Avenue {col}"),
                class(col),
            ));
        }
    }
    (segments, size * size)
}

fn build_atlas(size: usize) -> RoadAtlas {
    let (segments, vertices) = generate_grid(size);
    let mut atlas = RoadAtlas::new();
    atlas.build(segments, vertices).unwrap();
    atlas
}

fn viewport(x1: f64, y1: f64, x2: f64, y2: f64) -> Rect<f64> {
    Rect::new(Coord { x: x1, y: y1 }, Coord { x: x2, y: y2 })
}

fn bench_construction(c: &mut Criterion) {
    let mut group = c.benchmark_group("construction");
    group.sample_size(20);

    let (segments, vertices) = generate_grid(50);
    group.throughput(Throughput::Elements(segments.len() as u64));
    group.bench_function("grid_50x50", |b| {
        b.iter(|| {
            let mut atlas = RoadAtlas::new();
            atlas.build(segments.clone(), vertices).unwrap();
        });
    });

    group.finish();
}

fn bench_range_query(c: &mut Criterion) {
    let mut group = c.benchmark_group("range_query");
    let atlas = build_atlas(50);

    // A few blocks, detailed view.
    let small = viewport(2000.0, 2000.0, 2500.0, 2500.0);
    group.bench_function("small_window_all_classes", |b| {
        b.iter(|| atlas.range_query(small, RoadClass::max_zoom()));
    });

    // Whole city, but only primary roads visible.
    let overview = viewport(0.0, 0.0, 5000.0, 5000.0);
    group.bench_function("overview_primary_only", |b| {
        b.iter(|| atlas.range_query(overview, 0));
    });

    group.finish();
}

fn bench_name_queries(c: &mut Criterion) {
    let mut group = c.benchmark_group("name_query");
    let atlas = build_atlas(50);

    group.bench_function("prefix_match", |b| {
        b.iter(|| atlas.prefix_match("street 1"));
    });

    group.bench_function("wildcard_match", |b| {
        b.iter(|| atlas.wildcard_match("Street .2"));
    });

    group.finish();
}

fn bench_shortest_path(c: &mut Criterion) {
    let mut group = c.benchmark_group("shortest_path");
    group.sample_size(20);

    let atlas = build_atlas(50);
    // Opposite corners of the grid.
    let from = atlas.all_segments()[0].clone();
    let to = atlas.all_segments()[atlas.segment_count() - 1].clone();

    group.bench_function("corner_to_corner_50x50", |b| {
        b.iter(|| atlas.shortest_path(&from, &to).unwrap());
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_construction,
    bench_range_query,
    bench_name_queries,
    bench_shortest_path,
);

criterion_main!(benches);
