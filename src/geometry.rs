//! Planar geometry over drawing polygons.
//!
//! The operations the classifier and localizer need, and nothing more:
//! containment, area, intersection area, the label anchor point, and the
//! label orientation.
//!
//! # Conventions
//!
//! - [`contains`] is strict: a point lying on an edge or vertex (within
//!   [`BOUNDARY_EPSILON`] relative to the edge length) is *not* contained.
//! - [`centroid`] is the midpoint of the axis-aligned bounding box, not the
//!   area centroid. Labels are anchored there.
//! - [`shortest_edge_orientation`] ignores zero-length edges (repeated
//!   vertices).

use i_overlay::core::fill_rule::FillRule;
use i_overlay::core::overlay_rule::OverlayRule;
use i_overlay::float::single::SingleFloatOverlay;
use thiserror::Error;

use crate::ir::{Point, Polygon};

/// Relative tolerance used by the boundary test in [`contains`].
pub const BOUNDARY_EPSILON: f64 = 1e-9;

/// A polygon that geometry routines cannot work with.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum GeometryError {
    #[error("polygon has {count} vertex(es), at least 3 are required")]
    TooFewVertices { count: usize },

    #[error("polygon has a non-finite coordinate")]
    NonFiniteCoordinate,
}

fn check_polygon(polygon: &Polygon) -> Result<(), GeometryError> {
    if polygon.len() < 3 {
        return Err(GeometryError::TooFewVertices {
            count: polygon.len(),
        });
    }
    if !polygon.is_finite() {
        return Err(GeometryError::NonFiniteCoordinate);
    }
    Ok(())
}

/// Point-in-polygon test (even-odd ray casting).
///
/// Boundary points are not contained. Polygons with fewer than three
/// vertices contain nothing.
pub fn contains(polygon: &Polygon, point: &Point) -> bool {
    let vertices = polygon.vertices();
    if vertices.len() < 3 || !point.is_finite() {
        return false;
    }

    if polygon.edges().any(|(a, b)| on_segment(&a, &b, point)) {
        return false;
    }

    let mut inside = false;
    let mut j = vertices.len() - 1;
    for i in 0..vertices.len() {
        let (pi, pj) = (vertices[i], vertices[j]);
        if (pi.y > point.y) != (pj.y > point.y) {
            let x_cross = (pj.x - pi.x) * (point.y - pi.y) / (pj.y - pi.y) + pi.x;
            if point.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

fn on_segment(a: &Point, b: &Point, p: &Point) -> bool {
    let len = a.distance(b);
    if len == 0.0 {
        return a.distance(p) <= BOUNDARY_EPSILON;
    }
    let cross = (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x);
    if cross.abs() > BOUNDARY_EPSILON * len.max(1.0) * len {
        return false;
    }
    let dot = (p.x - a.x) * (b.x - a.x) + (p.y - a.y) * (b.y - a.y);
    let tol = BOUNDARY_EPSILON * len * len;
    dot >= -tol && dot <= len * len + tol
}

/// Signed shoelace area; positive for counter-clockwise rings.
fn signed_area(points: impl ExactSizeIterator<Item = [f64; 2]> + Clone) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let next = points.clone().cycle().skip(1);
    let twice: f64 = points
        .zip(next)
        .take(n)
        .map(|(p, q)| p[0] * q[1] - q[0] * p[1])
        .sum();
    twice / 2.0
}

/// Area enclosed by the polygon (absolute shoelace area).
///
/// Returns 0 for polygons with fewer than three vertices.
pub fn area(polygon: &Polygon) -> f64 {
    signed_area(polygon.vertices().iter().map(|p| [p.x, p.y])).abs()
}

/// Area of the intersection of two simple polygons; 0 when disjoint.
///
/// Both polygons may be non-convex. Either one having a zero area yields 0.
pub fn intersection_area(a: &Polygon, b: &Polygon) -> Result<f64, GeometryError> {
    check_polygon(a)?;
    check_polygon(b)?;

    if let (Some(ba), Some(bb)) = (a.bounds(), b.bounds()) {
        let disjoint = ba.max.x < bb.min.x
            || bb.max.x < ba.min.x
            || ba.max.y < bb.min.y
            || bb.max.y < ba.min.y;
        if disjoint {
            return Ok(0.0);
        }
    }
    if area(a) == 0.0 || area(b) == 0.0 {
        return Ok(0.0);
    }

    let subject: Vec<[f64; 2]> = a.vertices().iter().map(|p| [p.x, p.y]).collect();
    let clip: Vec<[f64; 2]> = b.vertices().iter().map(|p| [p.x, p.y]).collect();

    let shapes = subject.overlay(&[clip], OverlayRule::Intersect, FillRule::NonZero);

    // Each shape is an outer contour followed by its holes.
    let total: f64 = shapes
        .iter()
        .map(|shape| {
            let mut contours = shape.iter();
            let outer = contours
                .next()
                .map(|c| signed_area(c.iter().copied()).abs())
                .unwrap_or(0.0);
            let holes: f64 = contours.map(|c| signed_area(c.iter().copied()).abs()).sum();
            outer - holes
        })
        .sum();

    Ok(total.max(0.0))
}

/// Label anchor point: the midpoint of the polygon's axis-aligned bounding box.
///
/// Not the area centroid: for an L-shaped slab the anchor may fall outside
/// the outline.
pub fn centroid(polygon: &Polygon) -> Result<Point, GeometryError> {
    check_polygon(polygon)?;
    polygon
        .bounds()
        .map(|b| b.center())
        .ok_or(GeometryError::TooFewVertices {
            count: polygon.len(),
        })
}

/// Direction of the polygon's shortest edge, in degrees within `[0, 360)`.
///
/// The closing edge is considered. Zero-length edges are ignored. Fewer than
/// three vertices, or no edge with a positive length, yields 0. On ties the
/// first edge in vertex order wins.
pub fn shortest_edge_orientation(polygon: &Polygon) -> f64 {
    if polygon.len() < 3 {
        return 0.0;
    }

    let shortest = polygon
        .edges()
        .map(|(a, b)| (a.distance(&b), a, b))
        .filter(|(len, _, _)| len.is_finite() && *len > 0.0)
        .fold(None, |best: Option<(f64, Point, Point)>, edge| match best {
            Some(b) if b.0 <= edge.0 => Some(b),
            _ => Some(edge),
        });

    let Some((_, a, b)) = shortest else {
        return 0.0;
    };

    normalize_degrees((b.y - a.y).atan2(b.x - a.x).to_degrees())
}

fn normalize_degrees(deg: f64) -> f64 {
    let wrapped = deg.rem_euclid(360.0);
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn l_shape() -> Polygon {
        // 4x4 square with the top-right 2x2 quadrant removed (area 12).
        Polygon::from_coords(&[
            (0.0, 0.0),
            (4.0, 0.0),
            (4.0, 2.0),
            (2.0, 2.0),
            (2.0, 4.0),
            (0.0, 4.0),
        ])
    }

    #[test]
    fn test_contains_interior_and_exterior() {
        let square = Polygon::rectangle(0.0, 0.0, 10.0, 10.0);
        assert!(contains(&square, &Point::new(5.0, 5.0)));
        assert!(!contains(&square, &Point::new(15.0, 5.0)));
        assert!(!contains(&square, &Point::new(-1.0, -1.0)));
    }

    #[test]
    fn test_contains_non_convex() {
        let l = l_shape();
        assert!(contains(&l, &Point::new(1.0, 3.0)));
        assert!(contains(&l, &Point::new(3.0, 1.0)));
        assert!(!contains(&l, &Point::new(3.0, 3.0)));
    }

    #[test]
    fn test_contains_boundary_is_excluded() {
        let square = Polygon::rectangle(0.0, 0.0, 10.0, 10.0);
        assert!(!contains(&square, &Point::new(0.0, 5.0)));
        assert!(!contains(&square, &Point::new(10.0, 10.0)));
        assert!(!contains(&square, &Point::new(5.0, 0.0)));
    }

    #[test]
    fn test_contains_degenerate_polygon() {
        let segment = Polygon::from_coords(&[(0.0, 0.0), (10.0, 10.0)]);
        assert!(!contains(&segment, &Point::new(5.0, 5.0)));
    }

    #[test]
    fn test_area() {
        assert_eq!(area(&Polygon::rectangle(0.0, 0.0, 4.0, 3.0)), 12.0);
        assert_eq!(area(&l_shape()), 12.0);

        // Clockwise winding gives the same absolute area.
        let cw = Polygon::from_coords(&[(0.0, 0.0), (0.0, 3.0), (4.0, 3.0), (4.0, 0.0)]);
        assert_eq!(area(&cw), 12.0);

        assert_eq!(area(&Polygon::from_coords(&[(0.0, 0.0), (1.0, 1.0)])), 0.0);
    }

    #[test]
    fn test_intersection_area_overlap() {
        let a = Polygon::rectangle(0.0, 0.0, 4.0, 4.0);
        let b = Polygon::rectangle(2.0, 2.0, 6.0, 6.0);
        let inter = intersection_area(&a, &b).unwrap();
        assert!((inter - 4.0).abs() < 1e-6, "got {inter}");
    }

    #[test]
    fn test_intersection_area_contained() {
        let outer = Polygon::rectangle(0.0, 0.0, 10.0, 10.0);
        let inner = Polygon::rectangle(2.0, 3.0, 5.0, 7.0);
        let inter = intersection_area(&outer, &inner).unwrap();
        assert!((inter - 12.0).abs() < 1e-6, "got {inter}");
    }

    #[test]
    fn test_intersection_area_non_convex() {
        // The square over the L's missing quadrant only overlaps its arms.
        let square = Polygon::rectangle(1.0, 1.0, 3.0, 3.0);
        let inter = intersection_area(&l_shape(), &square).unwrap();
        assert!((inter - 3.0).abs() < 1e-6, "got {inter}");
    }

    #[test]
    fn test_intersection_area_disjoint() {
        let a = Polygon::rectangle(0.0, 0.0, 1.0, 1.0);
        let b = Polygon::rectangle(5.0, 5.0, 6.0, 6.0);
        assert_eq!(intersection_area(&a, &b).unwrap(), 0.0);
    }

    #[test]
    fn test_intersection_area_rejects_malformed() {
        let good = Polygon::rectangle(0.0, 0.0, 1.0, 1.0);
        let short = Polygon::from_coords(&[(0.0, 0.0), (1.0, 1.0)]);
        assert_eq!(
            intersection_area(&good, &short),
            Err(GeometryError::TooFewVertices { count: 2 })
        );

        let nan = Polygon::from_coords(&[(0.0, 0.0), (f64::NAN, 0.0), (0.0, 1.0)]);
        assert_eq!(
            intersection_area(&nan, &good),
            Err(GeometryError::NonFiniteCoordinate)
        );
    }

    #[test]
    fn test_centroid_is_bounding_box_midpoint() {
        // The area centroid of the L is (5/3, 5/3); the anchor is (2, 2).
        assert_eq!(centroid(&l_shape()).unwrap(), Point::new(2.0, 2.0));

        let tri = Polygon::from_coords(&[(0.0, 0.0), (6.0, 0.0), (0.0, 3.0)]);
        assert_eq!(centroid(&tri).unwrap(), Point::new(3.0, 1.5));

        assert!(centroid(&Polygon::default()).is_err());
    }

    #[test]
    fn test_shortest_edge_orientation() {
        // Wide rectangle: the shortest edge is the right side, going up.
        let wide = Polygon::rectangle(0.0, 0.0, 10.0, 2.0);
        assert!((shortest_edge_orientation(&wide) - 90.0).abs() < 1e-9);

        // Tall rectangle: the shortest edge is the bottom, going right.
        let tall = Polygon::rectangle(0.0, 0.0, 2.0, 10.0);
        assert!(shortest_edge_orientation(&tall).abs() < 1e-9);
    }

    #[test]
    fn test_shortest_edge_orientation_normalizes_negative_angles() {
        // Shortest edge runs from (2, 2) down to (2, 1): -90 deg -> 270.
        let poly = Polygon::from_coords(&[(0.0, 0.0), (0.0, 8.0), (2.0, 2.0), (2.0, 1.0)]);
        let angle = shortest_edge_orientation(&poly);
        assert!((angle - 270.0).abs() < 1e-9, "got {angle}");
        assert!((0.0..360.0).contains(&angle));
    }

    #[test]
    fn test_shortest_edge_orientation_degenerate() {
        assert_eq!(
            shortest_edge_orientation(&Polygon::from_coords(&[(0.0, 0.0), (1.0, 1.0)])),
            0.0
        );
        let collapsed = Polygon::from_coords(&[(1.0, 1.0), (1.0, 1.0), (1.0, 1.0)]);
        assert_eq!(shortest_edge_orientation(&collapsed), 0.0);
    }
}
