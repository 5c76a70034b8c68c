#![allow(dead_code)]

use prelosa::ir::{Point, Polygon};
use proptest::prelude::*;
use proptest::strategy::BoxedStrategy;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};

/// Inch calibers that appear in slab drawings.
pub const INCH_CALIBERS: [&str; 5] = ["1/4\"", "3/8\"", "1/2\"", "5/8\"", "3/4\""];

pub fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(64);

    let mut config = ProptestConfig::with_failure_persistence(FileFailurePersistence::WithSource(
        "proptest-regressions",
    ));
    config.cases = cases;
    config.max_shrink_iters = 1024;
    config
}

/// An axis-aligned rectangle given as `(xmin, ymin, width, height)`, in
/// drawing units, away from the origin so negative offsets stay meaningful.
pub fn arb_rect() -> BoxedStrategy<(f64, f64, f64, f64)> {
    (-500i32..=500, -500i32..=500, 1u32..=400, 1u32..=400)
        .prop_map(|(x, y, w, h)| (x as f64 / 4.0, y as f64 / 4.0, w as f64 / 4.0, h as f64 / 4.0))
        .boxed()
}

pub fn rect_polygon((x, y, w, h): (f64, f64, f64, f64)) -> Polygon {
    Polygon::rectangle(x, y, x + w, y + h)
}

/// A regular n-gon with its centre and inradius.
pub fn arb_regular_polygon() -> BoxedStrategy<(Polygon, Point, f64)> {
    (3usize..=12, -100i32..=100, -100i32..=100, 0u32..=1000)
        .prop_map(|(n, cx, cy, extra)| {
            let centre = Point::new(cx as f64, cy as f64);
            let radius = 10.0 + extra as f64 / 100.0;
            let vertices = (0..n)
                .map(|i| {
                    let angle = std::f64::consts::TAU * i as f64 / n as f64;
                    Point::new(centre.x + radius * angle.cos(), centre.y + radius * angle.sin())
                })
                .collect();
            // Inscribed circle of a regular n-gon.
            let inradius = radius * (std::f64::consts::PI / n as f64).cos();
            (Polygon::new(vertices), centre, inradius)
        })
        .boxed()
}

/// A point inside the unit square, excluding a margin around its edges.
pub fn arb_unit_fraction() -> BoxedStrategy<(f64, f64)> {
    (1u32..=99, 1u32..=99)
        .prop_map(|(fx, fy)| (fx as f64 / 100.0, fy as f64 / 100.0))
        .boxed()
}

/// A spacing in metres that the label format can represent: whole
/// millimetres from 5 mm to 995 mm.
pub fn arb_spacing() -> BoxedStrategy<f64> {
    (1u32..=199).prop_map(|steps| steps as f64 * 0.005).boxed()
}

/// A raw drawing notation `(text, count, caliber, spacing digits)`, written
/// the way a CAD exporter hands it over.
pub fn arb_raw_notation() -> BoxedStrategy<(String, u32, &'static str, String)> {
    (
        1u32..=9,
        prop::sample::select(INCH_CALIBERS.to_vec()),
        prop::sample::select(vec!["10", "125", "15", "175", "20", "25", "30"]),
        prop::sample::select(vec!["%%C", "%%c", "∅", "{\\C1;%%C}"]),
        any::<bool>(),
    )
        .prop_map(|(count, caliber, digits, escape, mtext_suffix)| {
            let mut text = format!("{}{}{}@{}", count, escape, caliber, digits);
            if mtext_suffix {
                text.push_str("\\A1;");
            }
            (text, count, caliber, digits.to_string())
        })
        .boxed()
}
