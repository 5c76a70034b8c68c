//! Spatial lookup of texts inside a polygon.

use crate::geometry::contains;
use crate::ir::{AnchoredText, Polygon};

/// Normalized content of every text whose insertion point lies inside
/// `polygon`, in input order. Texts that normalize to an empty string are
/// dropped.
pub fn localize(polygon: &Polygon, texts: &[AnchoredText]) -> Vec<String> {
    localize_refs(polygon, texts)
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Borrowing variant of [`localize`].
pub fn localize_refs<'a>(polygon: &Polygon, texts: &'a [AnchoredText]) -> Vec<&'a str> {
    let Some(bounds) = polygon.bounds() else {
        return Vec::new();
    };

    texts
        .iter()
        .filter(|t| bounds.contains_point(&t.insertion) && contains(polygon, &t.insertion))
        .map(AnchoredText::normalized)
        .filter(|content| !content.is_empty())
        .collect()
}
