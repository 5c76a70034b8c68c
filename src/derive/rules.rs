//! Slab type rules.
//!
//! Each slab type maps to one [`SlabTypeRule`]. The type-specific behaviour
//! is the closed set of [`RuleKind`] variants; everything else (bar caliber,
//! default spacings, how textual spacing digits convert) is plain data.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use super::label::parse_spacing_code;
use crate::text::SpacingConversion;

/// Solid slab.
pub const SOLID: &str = "solid";
/// Solid slab with a fixed first transverse spacing.
pub const SOLID_VARIANT: &str = "solid-variant";
/// Lightened slab spanning one direction.
pub const LIGHTENED_SINGLE_DIRECTION: &str = "lightened-single-direction";
/// Lightened slab spanning two directions.
pub const LIGHTENED_TWO_DIRECTION: &str = "lightened-two-direction";

/// The built-in slab type names.
pub const BUILTIN_SLAB_TYPES: [&str; 4] = [
    SOLID,
    SOLID_VARIANT,
    LIGHTENED_SINGLE_DIRECTION,
    LIGHTENED_TWO_DIRECTION,
];

/// How a slab type produces its transverse outputs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum RuleKind {
    /// Transverse values derive from the computed transverse spacing, with
    /// the `@20` correction applied.
    Computed {
        /// Emit a second transverse label equal to the first.
        #[serde(default)]
        emit_transverse2: bool,
    },
    /// The first transverse label is fixed; a second one, when the defaults
    /// define it, is computed.
    FixedFirstTransverse {
        #[serde(deserialize_with = "de_spacing")]
        transverse1: f64,
    },
    /// Both transverse labels are fixed; only the longitudinal one is computed.
    FixedTransverse {
        #[serde(deserialize_with = "de_spacing")]
        transverse1: f64,
        #[serde(default, deserialize_with = "de_opt_spacing")]
        transverse2: Option<f64>,
    },
}

/// Spacings used when a zone has no texts.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpacingDefaults {
    #[serde(deserialize_with = "de_spacing")]
    pub longitudinal: f64,
    #[serde(deserialize_with = "de_spacing")]
    pub transverse1: f64,
    #[serde(default, deserialize_with = "de_opt_spacing")]
    pub transverse2: Option<f64>,
}

/// Configuration record for one slab type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SlabTypeRule {
    /// Slab type name. Filled from the configuration key when omitted.
    #[serde(default)]
    pub name: String,

    #[serde(flatten)]
    pub kind: RuleKind,

    /// Bar count rendered in labels.
    #[serde(default = "default_bar_count")]
    pub bar_count: u32,

    /// Bar caliber rendered in labels and used by the aggregate calculator.
    #[serde(default = "default_caliber")]
    pub caliber: String,

    pub defaults: SpacingDefaults,

    /// How spacing digits read from text convert to metres.
    #[serde(default)]
    pub spacing_conversion: SpacingConversion,
}

fn default_bar_count() -> u32 {
    1
}

fn default_caliber() -> String {
    "3/8\"".to_string()
}

impl SlabTypeRule {
    /// A rule with the default bar (`1Ø3/8"`) and decimal-prefix spacing.
    pub fn new(name: impl Into<String>, kind: RuleKind, defaults: SpacingDefaults) -> Self {
        Self {
            name: name.into(),
            kind,
            bar_count: default_bar_count(),
            caliber: default_caliber(),
            defaults,
            spacing_conversion: SpacingConversion::default(),
        }
    }

    /// Sets the bar caliber.
    pub fn with_caliber(mut self, caliber: impl Into<String>) -> Self {
        self.caliber = caliber.into();
        self
    }

    /// Returns true if labels for this type carry a second transverse field.
    pub fn defines_transverse2(&self) -> bool {
        match &self.kind {
            RuleKind::Computed { emit_transverse2 } => *emit_transverse2,
            RuleKind::FixedFirstTransverse { .. } => self.defaults.transverse2.is_some(),
            RuleKind::FixedTransverse { transverse2, .. } => transverse2.is_some(),
        }
    }
}

/// The built-in rule table.
pub fn builtin_rules() -> BTreeMap<String, SlabTypeRule> {
    let rules = [
        SlabTypeRule::new(
            SOLID,
            RuleKind::Computed {
                emit_transverse2: false,
            },
            SpacingDefaults {
                longitudinal: 0.20,
                transverse1: 0.20,
                transverse2: None,
            },
        ),
        SlabTypeRule::new(
            SOLID_VARIANT,
            RuleKind::FixedFirstTransverse { transverse1: 0.25 },
            SpacingDefaults {
                longitudinal: 0.20,
                transverse1: 0.25,
                transverse2: None,
            },
        ),
        SlabTypeRule::new(
            LIGHTENED_SINGLE_DIRECTION,
            RuleKind::FixedTransverse {
                transverse1: 0.25,
                transverse2: None,
            },
            SpacingDefaults {
                longitudinal: 0.25,
                transverse1: 0.25,
                transverse2: None,
            },
        ),
        SlabTypeRule::new(
            LIGHTENED_TWO_DIRECTION,
            RuleKind::Computed {
                emit_transverse2: true,
            },
            SpacingDefaults {
                longitudinal: 0.25,
                transverse1: 0.25,
                transverse2: Some(0.25),
            },
        ),
    ];

    rules.into_iter().map(|r| (r.name.clone(), r)).collect()
}

/// A spacing in configuration: a number of metres (`0.2`) or a label code
/// string (`".20"`, `"@.175"`, `"20"`, `"0.25"`).
#[derive(Deserialize)]
#[serde(untagged)]
enum SpacingRepr {
    Number(f64),
    Code(String),
}

fn spacing_from_repr<E: serde::de::Error>(repr: SpacingRepr) -> Result<f64, E> {
    let value = match repr {
        SpacingRepr::Number(v) => Some(v),
        SpacingRepr::Code(code) => {
            let trimmed = code.trim();
            if trimmed.starts_with("0.") {
                trimmed.parse().ok()
            } else {
                parse_spacing_code(trimmed)
            }
        }
    };
    value
        .filter(|v| v.is_finite() && *v > 0.0)
        .ok_or_else(|| {
            E::custom("spacing must be a positive number or a spacing code like \".20\"")
        })
}

pub(crate) fn de_spacing<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    spacing_from_repr(SpacingRepr::deserialize(deserializer)?)
}

pub(crate) fn de_opt_spacing<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<f64>, D::Error> {
    match Option::<SpacingRepr>::deserialize(deserializer)? {
        Some(repr) => spacing_from_repr(repr).map(Some),
        None => Ok(None),
    }
}
