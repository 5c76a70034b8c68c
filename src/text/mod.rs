//! Text handling: normalization, spatial localization, and notation parsing.
//!
//! - [`normalize_text`] turns raw CAD text into the plain notation form.
//! - [`localize`] picks the texts anchored inside a polygon.
//! - [`parse_notation`] extracts count, diameter and spacing.
//!
//! ```
//! use prelosa::text::{normalize_text, parse_notation};
//!
//! let text = normalize_text("1%%C3/8\"@20\\A1;");
//! let parsed = parse_notation(&text);
//! assert_eq!(parsed.diameter.as_deref(), Some("3/8\""));
//! assert_eq!(parsed.spacing, Some(0.20));
//! ```

mod localize;
mod normalize;
pub mod notation;

pub use localize::{localize, localize_refs};
pub use normalize::{normalize_text, DIAMETER_SYMBOL};
pub use notation::{
    diameter_in_mm, parse_notation, parse_notations, parse_spacing_digits, DiameterUnit,
    ParsedNotation, SpacingConversion,
};
