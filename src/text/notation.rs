//! Reinforcement notation parser.
//!
//! Extracts `{count, diameter, unit, spacing}` from normalized text such as
//! `1∅3/8"@20` or `2∅12 mm@15`. Grammars are tried in order and the first
//! match wins per field:
//!
//! | field    | grammar                                  |
//! |----------|------------------------------------------|
//! | all      | `∅(\d+/\d+)"@(\d+)` not followed by `.` (fast path) |
//! | count    | `^(\d+)∅`, absent or 0 → 1               |
//! | diameter | `∅([\d/]+)` + optional `mm`, then `∅([\w/]+)` |
//! | spacing  | `@(\d+)`, also accepting `@.20` / `@0.20` |
//!
//! A dotted spacing (`@.20`, `@0.20`) is kept as `.20` in
//! [`ParsedNotation::spacing_code`]: it is already metres and never counts as
//! the bare `@20` code.
//!
//! Parsing never fails. A [`ParsedNotation`] with every field absent means no
//! grammar matched.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

static COMBINED_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"∅(\d+/\d+)"@(\d+)(?:[^\d.]|$)"#).expect("valid combined notation regex")
});

static COUNT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)∅").expect("valid count regex"));

static DIAMETER_NUMERIC_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"∅([\d/]+)(\s*[mM][mM]\b)?").expect("valid numeric diameter regex")
});

static DIAMETER_WORD_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"∅([\w/]+)").expect("valid word diameter regex"));

static SPACING_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@(0?\.)?(\d+)").expect("valid spacing regex"));

/// Unit a diameter token is expressed in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiameterUnit {
    /// Fractional or whole inches (`3/8"`).
    Inch,
    /// Millimetres (`8mm`).
    Millimeter,
}

/// How the digits after `@` become a spacing in metres.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SpacingConversion {
    /// Prefix `0.` to the digits: `20` → 0.20, `175` → 0.175.
    #[default]
    DecimalPrefix,
    /// Read the digits as centimetres: `20` → 0.20, `175` → 1.75.
    Centimeters,
}

/// Structured values parsed from one notation text.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedNotation {
    /// Number of bars; defaults to 1 when anything else parsed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,

    /// Diameter token with its unit suffix (`3/8"`, `8mm`, `N4`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diameter: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<DiameterUnit>,

    /// Spacing in metres, read with [`SpacingConversion::DecimalPrefix`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spacing: Option<f64>,

    /// Raw digits after `@`, before any conversion. Dotted forms keep a
    /// leading `.`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spacing_code: Option<String>,
}

impl ParsedNotation {
    /// Returns true if no grammar matched.
    pub fn is_empty(&self) -> bool {
        self.count.is_none()
            && self.diameter.is_none()
            && self.unit.is_none()
            && self.spacing.is_none()
            && self.spacing_code.is_none()
    }

    /// Spacing re-read from the raw digits with the given conversion.
    pub fn spacing_with(&self, conversion: SpacingConversion) -> Option<f64> {
        self.spacing_code
            .as_deref()
            .and_then(|digits| parse_spacing_digits(digits, conversion))
    }

    /// Returns true if the raw spacing digits are exactly `code`.
    pub fn has_spacing_code(&self, code: &str) -> bool {
        self.spacing_code.as_deref() == Some(code)
    }
}

impl fmt::Display for ParsedNotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("<unparsed>");
        }
        write!(
            f,
            "{}∅{}@{}",
            self.count.unwrap_or(1),
            self.diameter.as_deref().unwrap_or("?"),
            self.spacing_code.as_deref().unwrap_or("?")
        )
    }
}

/// Converts the digits after `@` into metres.
///
/// A leading `.` marks explicit metres and ignores `conversion`. Returns
/// `None` for an empty or non-numeric string.
pub fn parse_spacing_digits(digits: &str, conversion: SpacingConversion) -> Option<f64> {
    if let Some(fraction) = digits.strip_prefix('.') {
        return parse_spacing_digits(fraction, SpacingConversion::DecimalPrefix);
    }
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    match conversion {
        SpacingConversion::DecimalPrefix => format!("0.{digits}").parse().ok(),
        SpacingConversion::Centimeters => digits.parse::<f64>().ok().map(|cm| cm / 100.0),
    }
}

/// Parses one normalized notation text. Never fails.
pub fn parse_notation(text: &str) -> ParsedNotation {
    let mut parsed = ParsedNotation::default();

    if let Some(caps) = COMBINED_REGEX.captures(text) {
        let (diameter, unit) = finish_diameter(&caps[1], false);
        parsed.diameter = Some(diameter);
        parsed.unit = unit;
        set_spacing(&mut parsed, &caps[2]);
    }

    if parsed.diameter.is_none() {
        if let Some(caps) = DIAMETER_NUMERIC_REGEX.captures(text) {
            let (diameter, unit) = finish_diameter(&caps[1], caps.get(2).is_some());
            parsed.diameter = Some(diameter);
            parsed.unit = unit;
        } else if let Some(caps) = DIAMETER_WORD_REGEX.captures(text) {
            let (diameter, unit) = finish_diameter(&caps[1], false);
            parsed.diameter = Some(diameter);
            parsed.unit = unit;
        }
    }

    if parsed.spacing_code.is_none() {
        if let Some(caps) = SPACING_REGEX.captures(text) {
            if caps.get(1).is_some() {
                set_spacing(&mut parsed, &format!(".{}", &caps[2]));
            } else {
                set_spacing(&mut parsed, &caps[2]);
            }
        }
    }

    if parsed.diameter.is_none() && parsed.spacing_code.is_none() {
        debug!(text, "no notation grammar matched");
        return ParsedNotation::default();
    }

    parsed.count = Some(
        COUNT_REGEX
            .captures(text)
            .and_then(|caps| caps[1].parse().ok())
            .filter(|count| *count > 0)
            .unwrap_or(1),
    );

    parsed
}

/// Parses every text, keeping input order. Unparsed texts stay in the output
/// as empty notations so indices line up with the texts.
pub fn parse_notations<S: AsRef<str>>(texts: &[S]) -> Vec<ParsedNotation> {
    texts.iter().map(|t| parse_notation(t.as_ref())).collect()
}

fn set_spacing(parsed: &mut ParsedNotation, digits: &str) {
    parsed.spacing = parse_spacing_digits(digits, SpacingConversion::DecimalPrefix);
    parsed.spacing_code = Some(digits.to_string());
}

fn finish_diameter(token: &str, millimetres: bool) -> (String, Option<DiameterUnit>) {
    if millimetres {
        return (format!("{token}mm"), Some(DiameterUnit::Millimeter));
    }
    if token.contains('/') {
        let mut diameter = token.to_string();
        if !diameter.ends_with('"') {
            diameter.push('"');
        }
        return (diameter, Some(DiameterUnit::Inch));
    }
    let lower = token.to_ascii_lowercase();
    if let Some(number) = lower.strip_suffix("mm") {
        if !number.is_empty() && number.bytes().all(|b| b.is_ascii_digit()) {
            return (format!("{number}mm"), Some(DiameterUnit::Millimeter));
        }
    }
    (token.to_string(), None)
}

/// Diameter of a bar token in millimetres.
///
/// Understands `a/b"` (fractional inches, quote optional), `N"` (whole
/// inches) and `Nmm`. Anything else returns `None`.
pub fn diameter_in_mm(token: &str) -> Option<f64> {
    let token = token.trim();
    let lower = token.to_ascii_lowercase();
    if let Some(mm) = lower.strip_suffix("mm") {
        return mm.trim().parse::<f64>().ok().filter(|v| *v > 0.0);
    }

    let inches = token.trim_end_matches('"');
    let value = match inches.split_once('/') {
        Some((num, den)) => {
            let num: f64 = num.trim().parse().ok()?;
            let den: f64 = den.trim().parse().ok()?;
            if den == 0.0 {
                return None;
            }
            num / den
        }
        None if token.ends_with('"') => inches.trim().parse().ok()?,
        None => return None,
    };
    Some(value * 25.4).filter(|v| *v > 0.0 && v.is_finite())
}
