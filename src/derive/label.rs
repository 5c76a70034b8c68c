//! Label strings and the spacing code.
//!
//! Labels read `<count>Ø<diameter>@.<code>`, e.g. `1Ø3/8"@.20`. The code is
//! the spacing in millimetres (metres × 1000, rounded); whole decimetres are
//! compressed to two digits (200 → `20`), everything else is zero-padded to
//! three (175 → `175`, 50 → `050`). Every spacing the crate renders goes
//! through [`format_spacing`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::text::{parse_spacing_digits, SpacingConversion};

/// Symbol used in rendered labels (distinct from the `∅` of parsed text).
pub const LABEL_DIAMETER_SYMBOL: char = 'Ø';

/// The three label strings written at a slab's anchor point.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedLabel {
    pub longitudinal_text: String,
    pub transverse1_text: String,
    /// Absent means "omit this field".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transverse2_text: Option<String>,
}

impl fmt::Display for DerivedLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} | {}", self.longitudinal_text, self.transverse1_text)?;
        if let Some(t2) = &self.transverse2_text {
            write!(f, " | {}", t2)?;
        }
        Ok(())
    }
}

/// Renders a spacing in metres as its label code.
pub fn format_spacing(spacing: f64) -> String {
    let millimetres = (spacing * 1000.0).round() as i64;
    if millimetres % 100 == 0 {
        (millimetres / 10).to_string()
    } else {
        format!("{:03}", millimetres)
    }
}

/// Reads a label spacing code (with or without the leading `@.`) back into
/// metres. Inverse of [`format_spacing`] for spacings below one metre.
pub fn parse_spacing_code(code: &str) -> Option<f64> {
    let digits = code.trim().trim_start_matches('@').trim_start_matches('.');
    parse_spacing_digits(digits, SpacingConversion::DecimalPrefix)
}

/// Renders one bar label: `1Ø3/8"@.20`.
pub fn render_bar_label(count: u32, diameter: &str, spacing: f64) -> String {
    format!(
        "{}{}{}@.{}",
        count,
        LABEL_DIAMETER_SYMBOL,
        diameter,
        format_spacing(spacing)
    )
}
