//! Drawing model for prelosa.
//!
//! This module defines the format-agnostic representation of one structural
//! slab drawing: slab outlines, reinforcement zones, and anchored texts. A
//! drawing source (the JSON interchange reader in [`io_json`], or any CAD
//! exporter producing the same shape) fills a [`Drawing`]; the rest of the
//! engine only borrows it.
//!
//! # Design Principles
//!
//! 1. **Permissive Construction**: polygons with too few vertices or zero
//!    area can be represented, so that [`crate::validation`] can report them
//!    and the classifier can skip them, instead of failing the whole load.
//!
//! 2. **Opaque Identity**: [`SourceId`] carries the CAD entity handle through
//!    to diagnostics and output rows; nothing interprets it.
//!
//! # Example
//!
//! ```
//! use prelosa::ir::{AnchoredText, Drawing, Point, Polygon, Region, ZoneOrientation};
//!
//! let drawing = Drawing {
//!     regions: vec![
//!         Region::slab("1F", "solid", Polygon::rectangle(0.0, 0.0, 4.0, 3.0)),
//!         Region::zone(
//!             "2A",
//!             ZoneOrientation::Horizontal,
//!             Polygon::rectangle(0.5, 0.5, 3.5, 1.5),
//!         ),
//!     ],
//!     texts: vec![AnchoredText::new(Point::new(1.0, 1.0), "1%%C3/8\"@20")],
//!     ..Default::default()
//! };
//! assert_eq!(drawing.slabs().count(), 1);
//! ```

mod bbox;
mod coord;
mod ids;
pub mod io_json;
pub mod io_labels_csv;
mod model;
mod polygon;

// Re-export core types for convenient access
pub use bbox::Bounds;
pub use coord::Point;
pub use ids::SourceId;
pub use model::{AnchoredText, Drawing, DrawingInfo, Region, RegionCategory, ZoneOrientation};
pub use polygon::Polygon;
