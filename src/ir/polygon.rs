//! Implicitly closed polygons.

use serde::{Deserialize, Serialize};

use super::bbox::Bounds;
use super::coord::Point;

/// An ordered sequence of vertices; the last vertex connects back to the first.
///
/// Construction is permissive: fewer than three vertices or a zero-area ring
/// can be represented so that validation can report it. Geometry routines
/// return [`GeometryError`](crate::geometry::GeometryError) where such input
/// makes the result meaningless.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Polygon {
    vertices: Vec<Point>,
}

impl Polygon {
    /// Creates a polygon from its vertices.
    pub fn new(vertices: Vec<Point>) -> Self {
        Self { vertices }
    }

    /// Creates a polygon from `(x, y)` pairs.
    pub fn from_coords(coords: &[(f64, f64)]) -> Self {
        Self::new(coords.iter().copied().map(Point::from).collect())
    }

    /// Axis-aligned rectangle with corners `(xmin, ymin)` and `(xmax, ymax)`,
    /// wound counter-clockwise.
    pub fn rectangle(xmin: f64, ymin: f64, xmax: f64, ymax: f64) -> Self {
        Self::from_coords(&[(xmin, ymin), (xmax, ymin), (xmax, ymax), (xmin, ymax)])
    }

    /// The vertices, without a repeated closing vertex.
    #[inline]
    pub fn vertices(&self) -> &[Point] {
        &self.vertices
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Iterates over edges as `(start, end)` pairs, including the closing edge.
    pub fn edges(&self) -> impl Iterator<Item = (Point, Point)> + '_ {
        let n = self.vertices.len();
        (0..n).map(move |i| (self.vertices[i], self.vertices[(i + 1) % n]))
    }

    /// Axis-aligned bounds, or `None` for a polygon without vertices.
    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::of_points(&self.vertices)
    }

    /// Returns true if every vertex has finite coordinates.
    pub fn is_finite(&self) -> bool {
        self.vertices.iter().all(Point::is_finite)
    }
}

impl From<Vec<Point>> for Polygon {
    fn from(vertices: Vec<Point>) -> Self {
        Self::new(vertices)
    }
}
