//! Axis-aligned bounds of a point set.

use serde::{Deserialize, Serialize};

use super::coord::Point;

/// An axis-aligned bounding box (xmin, ymin, xmax, ymax).
///
/// Note: This type does NOT enforce that min <= max in the constructor.
/// [`Bounds::of_points`] always produces ordered bounds; hand-built values
/// may not be.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: Point,
    pub max: Point,
}

impl Bounds {
    /// Creates bounds from explicit coordinates.
    #[inline]
    pub fn from_xyxy(xmin: f64, ymin: f64, xmax: f64, ymax: f64) -> Self {
        Self {
            min: Point::new(xmin, ymin),
            max: Point::new(xmax, ymax),
        }
    }

    /// Smallest bounds enclosing every point, or `None` for an empty slice.
    pub fn of_points(points: &[Point]) -> Option<Self> {
        let first = points.first()?;
        let mut bounds = Self {
            min: *first,
            max: *first,
        };
        for p in &points[1..] {
            bounds.min.x = bounds.min.x.min(p.x);
            bounds.min.y = bounds.min.y.min(p.y);
            bounds.max.x = bounds.max.x.max(p.x);
            bounds.max.y = bounds.max.y.max(p.y);
        }
        Some(bounds)
    }

    /// Returns the width of the box.
    #[inline]
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    /// Returns the height of the box.
    #[inline]
    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    /// Midpoint of the box.
    #[inline]
    pub fn center(&self) -> Point {
        Point::new(
            (self.min.x + self.max.x) / 2.0,
            (self.min.y + self.max.y) / 2.0,
        )
    }

    /// Returns true if `p` lies inside or on the box.
    #[inline]
    pub fn contains_point(&self, p: &Point) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_of_points() {
        let points = [
            Point::new(4.0, 1.0),
            Point::new(-2.0, 3.0),
            Point::new(1.0, -5.0),
        ];
        let b = Bounds::of_points(&points).unwrap();
        assert_eq!(b, Bounds::from_xyxy(-2.0, -5.0, 4.0, 3.0));
        assert_eq!(b.width(), 6.0);
        assert_eq!(b.height(), 8.0);
        assert_eq!(b.center(), Point::new(1.0, -1.0));
    }

    #[test]
    fn test_bounds_of_empty_slice() {
        assert!(Bounds::of_points(&[]).is_none());
    }

    #[test]
    fn test_bounds_contains_point() {
        let b = Bounds::from_xyxy(0.0, 0.0, 10.0, 10.0);
        assert!(b.contains_point(&Point::new(5.0, 5.0)));
        assert!(b.contains_point(&Point::new(10.0, 0.0)));
        assert!(!b.contains_point(&Point::new(10.5, 5.0)));
    }
}
