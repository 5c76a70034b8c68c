//! Assignment of reinforcement zones to slabs.
//!
//! A zone belongs to a slab when enough of its own area falls inside the slab
//! outline: `area(slab ∩ zone) / area(zone) >= threshold`. Zones drawn across
//! two slabs are therefore claimed by every slab holding a large enough share.

use tracing::{debug, warn};

use crate::geometry::{area, intersection_area, GeometryError};
use crate::ir::{Polygon, Region};

/// Default overlap ratio for zone inclusion.
pub const DEFAULT_OVERLAP_THRESHOLD: f64 = 0.2;

/// Stricter profile, for drawings where zones overhang neighbouring slabs.
pub const STRICT_OVERLAP_THRESHOLD: f64 = 0.3;

/// Options for zone classification.
#[derive(Clone, Debug)]
pub struct ClassifyOptions {
    /// Minimum fraction of a zone's area that must lie inside the parent.
    pub overlap_threshold: f64,
}

impl Default for ClassifyOptions {
    fn default() -> Self {
        Self {
            overlap_threshold: DEFAULT_OVERLAP_THRESHOLD,
        }
    }
}

/// A candidate whose geometry could not be evaluated.
#[derive(Clone, Debug)]
pub struct SkippedCandidate<'a> {
    pub region: &'a Region,
    pub error: GeometryError,
}

/// Result of classifying candidates against one parent polygon.
#[derive(Clone, Debug, Default)]
pub struct Classification<'a> {
    /// Included candidates, in input order.
    pub included: Vec<&'a Region>,
    /// Candidates skipped because of a geometry error.
    pub skipped: Vec<SkippedCandidate<'a>>,
}

/// Fraction of `candidate`'s area lying inside `parent`.
///
/// A zero-area candidate has ratio 0.
pub fn overlap_ratio(parent: &Polygon, candidate: &Polygon) -> Result<f64, GeometryError> {
    let candidate_area = area(candidate);
    let shared = intersection_area(parent, candidate)?;
    if candidate_area == 0.0 {
        return Ok(0.0);
    }
    Ok(shared / candidate_area)
}

/// Selects the candidates contained in `parent` under the overlap rule.
///
/// One bad candidate never aborts the parent: geometry errors are logged and
/// the candidate is reported in [`Classification::skipped`].
pub fn classify_contained<'a, I>(
    parent: &Polygon,
    candidates: I,
    opts: &ClassifyOptions,
) -> Classification<'a>
where
    I: IntoIterator<Item = &'a Region>,
{
    let mut result = Classification::default();

    for candidate in candidates {
        match overlap_ratio(parent, &candidate.polygon) {
            Ok(ratio) if ratio >= opts.overlap_threshold => {
                debug!(zone = %candidate.id, ratio, "zone included");
                result.included.push(candidate);
            }
            Ok(_) => {}
            Err(error) => {
                warn!(zone = %candidate.id, %error, "skipping zone with invalid geometry");
                result.skipped.push(SkippedCandidate {
                    region: candidate,
                    error,
                });
            }
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::ZoneOrientation;

    fn zones() -> Vec<Region> {
        vec![
            // Fully inside.
            Region::zone(
                "inside",
                ZoneOrientation::Horizontal,
                Polygon::rectangle(1.0, 1.0, 3.0, 3.0),
            ),
            // 25% inside (x 9..10 of 9..13).
            Region::zone(
                "quarter",
                ZoneOrientation::Vertical,
                Polygon::rectangle(9.0, 1.0, 13.0, 2.0),
            ),
            // Disjoint.
            Region::zone(
                "outside",
                ZoneOrientation::Vertical,
                Polygon::rectangle(20.0, 20.0, 22.0, 22.0),
            ),
            // Malformed.
            Region::zone(
                "broken",
                ZoneOrientation::Horizontal,
                Polygon::from_coords(&[(1.0, 1.0), (2.0, 2.0)]),
            ),
        ]
    }

    fn slab() -> Polygon {
        Polygon::rectangle(0.0, 0.0, 10.0, 10.0)
    }

    fn ids<'a>(c: &Classification<'a>) -> Vec<&'a str> {
        c.included.iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn default_threshold_includes_partial_overlap() {
        let zones = zones();
        let result = classify_contained(&slab(), &zones, &ClassifyOptions::default());
        assert_eq!(ids(&result), vec!["inside", "quarter"]);
    }

    #[test]
    fn strict_threshold_excludes_partial_overlap() {
        let zones = zones();
        let opts = ClassifyOptions {
            overlap_threshold: STRICT_OVERLAP_THRESHOLD,
        };
        let result = classify_contained(&slab(), &zones, &opts);
        assert_eq!(ids(&result), vec!["inside"]);
    }

    #[test]
    fn malformed_candidate_is_skipped_not_fatal() {
        let zones = zones();
        let result = classify_contained(&slab(), &zones, &ClassifyOptions::default());
        assert_eq!(result.skipped.len(), 1);
        assert_eq!(result.skipped[0].region.id.as_str(), "broken");
        assert_eq!(
            result.skipped[0].error,
            GeometryError::TooFewVertices { count: 2 }
        );
    }

    #[test]
    fn overlap_ratio_values() {
        let inside = Polygon::rectangle(1.0, 1.0, 3.0, 3.0);
        assert!((overlap_ratio(&slab(), &inside).unwrap() - 1.0).abs() < 1e-9);

        let quarter = Polygon::rectangle(9.0, 1.0, 13.0, 2.0);
        assert!((overlap_ratio(&slab(), &quarter).unwrap() - 0.25).abs() < 1e-9);

        let flat = Polygon::from_coords(&[(1.0, 1.0), (2.0, 1.0), (3.0, 1.0)]);
        assert_eq!(overlap_ratio(&slab(), &flat).unwrap(), 0.0);
    }
}
