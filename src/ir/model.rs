//! Core drawing model for the prelosa engine.
//!
//! A [`Drawing`] is what a drawing source yields for one session: slab
//! outlines, reinforcement zones nested inside them, and point-anchored texts.
//! Everything here is read-only once loaded; the engine borrows it.

use std::fmt;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use super::coord::Point;
use super::ids::SourceId;
use super::polygon::Polygon;
use crate::text::normalize_text;

/// Everything the engine needs from one drawing.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Drawing {
    /// Metadata about the drawing.
    #[serde(default)]
    pub info: DrawingInfo,

    /// Slab outlines and reinforcement zones, in source order.
    pub regions: Vec<Region>,

    /// Point-anchored texts.
    #[serde(default)]
    pub texts: Vec<AnchoredText>,
}

impl Drawing {
    /// Slab regions, in source order.
    pub fn slabs(&self) -> impl Iterator<Item = &Region> {
        self.regions.iter().filter(|r| r.is_slab())
    }

    /// Reinforcement zone regions, in source order.
    pub fn zones(&self) -> impl Iterator<Item = &Region> {
        self.regions.iter().filter(|r| !r.is_slab())
    }
}

/// Metadata about the drawing.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DrawingInfo {
    /// Optional drawing name (usually the source file stem).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Optional free-form description of the units the drawing uses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub units: Option<String>,
}

/// Orientation of a reinforcement zone.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneOrientation {
    /// Bars run along the slab; feeds the longitudinal label.
    Horizontal,
    /// Bars run across the slab; feeds the transverse labels.
    Vertical,
}

impl fmt::Display for ZoneOrientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ZoneOrientation::Horizontal => f.write_str("horizontal"),
            ZoneOrientation::Vertical => f.write_str("vertical"),
        }
    }
}

/// What a region represents.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RegionCategory {
    /// A slab outline of the named construction type.
    Slab { slab_type: String },
    /// A reinforcement zone.
    Zone { orientation: ZoneOrientation },
}

/// A slab outline or reinforcement zone.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Region {
    /// Source entity identifier (diagnostics only).
    pub id: SourceId,

    /// Slab type or zone orientation, inlined as `kind` plus its field.
    #[serde(flatten)]
    pub category: RegionCategory,

    /// Outline.
    pub polygon: Polygon,
}

impl Region {
    /// Creates a slab region.
    pub fn slab(id: impl Into<SourceId>, slab_type: impl Into<String>, polygon: Polygon) -> Self {
        Self {
            id: id.into(),
            category: RegionCategory::Slab {
                slab_type: slab_type.into(),
            },
            polygon,
        }
    }

    /// Creates a reinforcement zone region.
    pub fn zone(id: impl Into<SourceId>, orientation: ZoneOrientation, polygon: Polygon) -> Self {
        Self {
            id: id.into(),
            category: RegionCategory::Zone { orientation },
            polygon,
        }
    }

    #[inline]
    pub fn is_slab(&self) -> bool {
        matches!(self.category, RegionCategory::Slab { .. })
    }

    /// The slab type, if this region is a slab.
    pub fn slab_type(&self) -> Option<&str> {
        match &self.category {
            RegionCategory::Slab { slab_type } => Some(slab_type),
            RegionCategory::Zone { .. } => None,
        }
    }

    /// The zone orientation, if this region is a reinforcement zone.
    pub fn orientation(&self) -> Option<ZoneOrientation> {
        match self.category {
            RegionCategory::Zone { orientation } => Some(orientation),
            RegionCategory::Slab { .. } => None,
        }
    }
}

/// A text entity anchored at its insertion point.
///
/// The normalized content is computed on first access and cached.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AnchoredText {
    /// Optional source entity identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<SourceId>,

    /// Insertion point.
    pub insertion: Point,

    /// Raw content as stored in the drawing (may contain MText escapes).
    content: String,

    #[serde(skip)]
    normalized: OnceLock<String>,
}

impl AnchoredText {
    /// Creates a new text at `insertion`.
    pub fn new(insertion: Point, content: impl Into<String>) -> Self {
        Self {
            id: None,
            insertion,
            content: content.into(),
            normalized: OnceLock::new(),
        }
    }

    /// Sets the source identifier.
    pub fn with_id(mut self, id: impl Into<SourceId>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Raw content as stored in the drawing.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Normalized content (see [`normalize_text`]).
    pub fn normalized(&self) -> &str {
        self.normalized.get_or_init(|| normalize_text(&self.content))
    }
}

impl PartialEq for AnchoredText {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.insertion == other.insertion && self.content == other.content
    }
}
