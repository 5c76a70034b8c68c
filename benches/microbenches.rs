//! Criterion microbenches for prelosa.
//!
//! Run with: `cargo bench`
//!
//! These benchmarks measure the performance of:
//! - Drawing JSON parsing (from_json_str)
//! - Notation normalization and parsing (normalize_text, parse_notation)
//! - Zone classification against one slab (classify_contained)
//! - A whole session over a generated drawing (run_session)

use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use std::hint::black_box;

use prelosa::classify::{classify_contained, ClassifyOptions};
use prelosa::config::SessionConfig;
use prelosa::ir::io_json::from_json_str;
use prelosa::ir::{AnchoredText, Drawing, Point, Polygon, Region, ZoneOrientation};
use prelosa::session::run_session;
use prelosa::text::{normalize_text, parse_notation};

// Include test fixtures at compile time (no file I/O during benchmark)
const DRAWING_FIXTURE: &str = include_str!("../tests/fixtures/drawing_valid.json");

const NOTATIONS: [&str; 6] = [
    "1%%C3/8\"@20",
    "{\\C1;2%%C1/2\"@.175\\A1;}",
    "1∅12mm@15",
    "1\\U+2205N4@25",
    "VER DETALLE",
    "1%%C5/8\"\"@0.30",
];

/// A row of `slabs` solid slabs, each with one zone per orientation and a
/// text in each zone.
fn grid_drawing(slabs: usize) -> Drawing {
    let mut drawing = Drawing::default();
    for i in 0..slabs {
        let x = i as f64 * 12.0;
        drawing.regions.push(Region::slab(
            format!("S{}", i),
            "solid",
            Polygon::rectangle(x, 0.0, x + 10.0, 4.0),
        ));
        drawing.regions.push(Region::zone(
            format!("H{}", i),
            ZoneOrientation::Horizontal,
            Polygon::rectangle(x + 1.0, 1.0, x + 9.0, 2.0),
        ));
        drawing.regions.push(Region::zone(
            format!("V{}", i),
            ZoneOrientation::Vertical,
            Polygon::rectangle(x + 4.0, 0.5, x + 5.0, 3.5),
        ));
        drawing
            .texts
            .push(AnchoredText::new(Point::new(x + 2.0, 1.5), "1%%C3/8\"@20"));
        drawing
            .texts
            .push(AnchoredText::new(Point::new(x + 4.5, 3.0), "1%%C1/2\"@25"));
    }
    drawing
}

/// Benchmark drawing JSON parsing from string.
fn bench_drawing_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("drawing_parse");
    group.throughput(Throughput::Bytes(DRAWING_FIXTURE.len() as u64));

    group.bench_function("from_json_str", |b| {
        b.iter(|| {
            let drawing = from_json_str(black_box(DRAWING_FIXTURE)).unwrap();
            black_box(drawing)
        })
    });

    group.finish();
}

/// Benchmark notation normalization plus parsing.
fn bench_notation_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("notation_parse");
    group.throughput(Throughput::Elements(NOTATIONS.len() as u64));

    group.bench_function("normalize_and_parse", |b| {
        b.iter(|| {
            for raw in NOTATIONS {
                let parsed = parse_notation(&normalize_text(black_box(raw)));
                black_box(parsed);
            }
        })
    });

    group.finish();
}

/// Benchmark classifying every zone of a drawing against one slab.
fn bench_classify(c: &mut Criterion) {
    let drawing = grid_drawing(50);
    let slab = Polygon::rectangle(0.0, 0.0, 10.0, 4.0);
    let opts = ClassifyOptions::default();

    let mut group = c.benchmark_group("classify");
    group.throughput(Throughput::Elements(drawing.zones().count() as u64));

    group.bench_function("classify_contained", |b| {
        b.iter(|| {
            let result = classify_contained(black_box(&slab), drawing.zones(), &opts);
            black_box(result.included.len())
        })
    });

    group.finish();
}

/// Benchmark a full session (classification, parsing, derivation, placement).
fn bench_session(c: &mut Criterion) {
    let drawing = grid_drawing(20);
    let config = SessionConfig::default();

    let mut group = c.benchmark_group("session");
    group.throughput(Throughput::Elements(drawing.slabs().count() as u64));

    group.bench_function("run_session", |b| {
        b.iter(|| {
            let (placements, report) = run_session(black_box(&drawing), &config);
            black_box((placements, report))
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_drawing_parse,
    bench_notation_parse,
    bench_classify,
    bench_session
);
criterion_main!(benches);
