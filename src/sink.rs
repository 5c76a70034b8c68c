//! Label sink: where finished labels go.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::derive::DerivedLabel;
use crate::ir::{Point, SourceId};

/// A label ready to be written into the drawing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LabelPlacement {
    /// Slab the label belongs to.
    pub slab: SourceId,
    pub slab_type: String,
    /// Bounding-box centre of the slab.
    pub insertion: Point,
    /// Orientation of the slab's shortest edge, in `[0, 360)`.
    pub angle_degrees: f64,
    pub label: DerivedLabel,
}

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("label sink rejected slab {slab}: {message}")]
    Rejected { slab: SourceId, message: String },
}

/// Receives labels one at a time, in slab order.
///
/// A failed insert is recorded by the session and never stops it.
pub trait LabelSink {
    fn insert(&mut self, placement: LabelPlacement) -> Result<(), SinkError>;
}

/// Keeps every placement in memory.
#[derive(Clone, Debug, Default)]
pub struct CollectingSink {
    pub placements: Vec<LabelPlacement>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_placements(self) -> Vec<LabelPlacement> {
        self.placements
    }
}

impl LabelSink for CollectingSink {
    fn insert(&mut self, placement: LabelPlacement) -> Result<(), SinkError> {
        self.placements.push(placement);
        Ok(())
    }
}

impl<S: LabelSink + ?Sized> LabelSink for &mut S {
    fn insert(&mut self, placement: LabelPlacement) -> Result<(), SinkError> {
        (**self).insert(placement)
    }
}
