//! Value derivation: parsed notations + aggregate results → label.
//!
//! [`derive`] is a pure function of its [`DerivationInput`]. The caller owns
//! the [`Baseline`] (the last-known-good values) and decides when to replace
//! it; derivation only reads it.
//!
//! Policy, per direction:
//!
//! 1. No texts anywhere: the label is the baseline, unchanged.
//! 2. Zone without texts: the rule's default spacing.
//! 3. Aggregate value present and positive: use it.
//! 4. Otherwise the first notation's spacing digits, converted with the
//!    rule's [`SpacingConversion`](crate::text::SpacingConversion). A
//!    vertical `@20` reads as 0.100.
//! 5. Otherwise the baseline.
//!
//! A final pass forces the transverse spacing to 0.100 when it sits within
//! 0.01 of 0.200 and any vertical text spells `@20`. The rule's
//! [`RuleKind`] then decides which transverse outputs are computed and which
//! are fixed.

mod aggregate;
mod label;
mod rules;

pub use aggregate::{
    AggregateCalculator, AggregateError, AggregateInputs, AggregateOutputs, BarSpec,
    CellBackedCalculator, CellEngine, CellLayout, CellValue, SteelAreaCalculator, ZoneCells,
    DEFAULT_SPACING_STEP,
};
pub use label::{
    format_spacing, parse_spacing_code, render_bar_label, DerivedLabel, LABEL_DIAMETER_SYMBOL,
};
pub use rules::{
    builtin_rules, RuleKind, SlabTypeRule, SpacingDefaults, BUILTIN_SLAB_TYPES,
    LIGHTENED_SINGLE_DIRECTION, LIGHTENED_TWO_DIRECTION, SOLID, SOLID_VARIANT,
};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::text::ParsedNotation;

/// Raw spacing code that vertical texts use for a 0.100 spacing.
pub const TWENTY_CODE: &str = "20";

/// Spacing the `@20` correction forces.
pub const TWENTY_CORRECTED_SPACING: f64 = 0.100;

/// Distance from 0.200 within which the correction applies.
pub const TWENTY_CORRECTION_TOLERANCE: f64 = 0.01;

/// One slab's spacing values, in metres.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpacingValues {
    #[serde(deserialize_with = "rules::de_spacing")]
    pub longitudinal: f64,
    #[serde(deserialize_with = "rules::de_spacing")]
    pub transverse1: f64,
    #[serde(
        default,
        deserialize_with = "rules::de_opt_spacing",
        skip_serializing_if = "Option::is_none"
    )]
    pub transverse2: Option<f64>,
}

impl Default for SpacingValues {
    fn default() -> Self {
        Self {
            longitudinal: 0.20,
            transverse1: 0.20,
            transverse2: None,
        }
    }
}

impl From<&SpacingDefaults> for SpacingValues {
    fn from(defaults: &SpacingDefaults) -> Self {
        Self {
            longitudinal: defaults.longitudinal,
            transverse1: defaults.transverse1,
            transverse2: defaults.transverse2,
        }
    }
}

/// Last-known-good values, used whenever a slab cannot produce its own.
pub type Baseline = SpacingValues;

/// Everything one slab's derivation reads.
#[derive(Clone, Copy, Debug)]
pub struct DerivationInput<'a> {
    pub rule: &'a SlabTypeRule,
    /// Notations from horizontal zones, in text order.
    pub horizontal: &'a [ParsedNotation],
    /// Notations from vertical zones, in text order.
    pub vertical: &'a [ParsedNotation],
    pub aggregate: &'a AggregateOutputs,
    pub baseline: &'a Baseline,
}

/// Something noteworthy that happened while deriving a slab.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum DerivationEvent {
    /// No texts in any zone; the baseline was reused.
    EmptySlab,
    /// Aggregate longitudinal missing; read from the first horizontal text.
    LongitudinalFromText { spacing: f64 },
    /// Aggregate transverse missing; read from the first vertical text.
    TransverseFromText { spacing: f64 },
    /// The `@20` correction replaced a transverse spacing.
    TwentyCorrection { from: f64 },
    /// No longitudinal value could be produced; the baseline was used.
    LongitudinalBaselineFallback { spacing: f64 },
    /// No transverse value could be produced; the baseline was used.
    TransverseBaselineFallback { spacing: f64 },
}

impl DerivationEvent {
    /// Returns true if a baseline value replaced a derived one.
    pub fn is_fallback(&self) -> bool {
        matches!(
            self,
            DerivationEvent::EmptySlab
                | DerivationEvent::LongitudinalBaselineFallback { .. }
                | DerivationEvent::TransverseBaselineFallback { .. }
        )
    }
}

/// Result of one slab's derivation.
#[derive(Clone, Debug, PartialEq)]
pub struct Derivation {
    pub values: SpacingValues,
    pub label: DerivedLabel,
    pub events: Vec<DerivationEvent>,
}

impl Derivation {
    /// Returns true if any output came from the baseline.
    pub fn used_fallback(&self) -> bool {
        self.events.iter().any(DerivationEvent::is_fallback)
    }
}

fn usable(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v > 0.0)
}

/// Where the computed transverse spacing came from.
enum TransverseSource {
    Default,
    Derived,
    Baseline,
}

/// Derives one slab's spacings and label.
pub fn derive(input: &DerivationInput<'_>) -> Derivation {
    let rule = input.rule;
    let mut events = Vec::new();

    if input.horizontal.is_empty() && input.vertical.is_empty() {
        let values = input.baseline.clone();
        return Derivation {
            label: render_label(rule, &values),
            values,
            events: vec![DerivationEvent::EmptySlab],
        };
    }

    let longitudinal = derive_longitudinal(input, &mut events);
    let (transverse1, transverse2) = match &rule.kind {
        RuleKind::Computed { .. } => {
            let (transverse, source) = derive_transverse(input, &mut events);
            let second = rule
                .defines_transverse2()
                .then(|| second_transverse(input, transverse, source));
            (transverse, second)
        }
        RuleKind::FixedFirstTransverse { transverse1 } => {
            let second = rule.defines_transverse2().then(|| {
                let (transverse, source) = derive_transverse(input, &mut events);
                second_transverse(input, transverse, source)
            });
            (*transverse1, second)
        }
        RuleKind::FixedTransverse {
            transverse1,
            transverse2,
        } => (*transverse1, *transverse2),
    };

    let values = SpacingValues {
        longitudinal,
        transverse1,
        transverse2,
    };
    debug!(slab_type = %rule.name, ?values, "derived spacings");

    Derivation {
        label: render_label(rule, &values),
        values,
        events,
    }
}

fn second_transverse(
    input: &DerivationInput<'_>,
    transverse: f64,
    source: TransverseSource,
) -> f64 {
    match source {
        TransverseSource::Default => input.rule.defaults.transverse2.unwrap_or(transverse),
        TransverseSource::Derived => transverse,
        TransverseSource::Baseline => input.baseline.transverse2.unwrap_or(transverse),
    }
}

fn derive_longitudinal(input: &DerivationInput<'_>, events: &mut Vec<DerivationEvent>) -> f64 {
    let rule = input.rule;
    let Some(first) = input.horizontal.first() else {
        return rule.defaults.longitudinal;
    };
    if let Some(value) = usable(input.aggregate.longitudinal) {
        return value;
    }
    if let Some(spacing) = usable(first.spacing_with(rule.spacing_conversion)) {
        events.push(DerivationEvent::LongitudinalFromText { spacing });
        return spacing;
    }
    let spacing = input.baseline.longitudinal;
    events.push(DerivationEvent::LongitudinalBaselineFallback { spacing });
    spacing
}

fn derive_transverse(
    input: &DerivationInput<'_>,
    events: &mut Vec<DerivationEvent>,
) -> (f64, TransverseSource) {
    let rule = input.rule;
    let Some(first) = input.vertical.first() else {
        return (rule.defaults.transverse1, TransverseSource::Default);
    };

    let (mut transverse, source) = if let Some(value) = usable(input.aggregate.transverse) {
        (value, TransverseSource::Derived)
    } else if first.has_spacing_code(TWENTY_CODE) {
        let spacing = TWENTY_CORRECTED_SPACING;
        events.push(DerivationEvent::TransverseFromText { spacing });
        (spacing, TransverseSource::Derived)
    } else if let Some(spacing) = usable(first.spacing_with(rule.spacing_conversion)) {
        events.push(DerivationEvent::TransverseFromText { spacing });
        (spacing, TransverseSource::Derived)
    } else {
        let spacing = input.baseline.transverse1;
        events.push(DerivationEvent::TransverseBaselineFallback { spacing });
        (spacing, TransverseSource::Baseline)
    };

    let near_twenty = (transverse - 0.200).abs() < TWENTY_CORRECTION_TOLERANCE;
    if near_twenty && input.vertical.iter().any(|n| n.has_spacing_code(TWENTY_CODE)) {
        events.push(DerivationEvent::TwentyCorrection { from: transverse });
        transverse = TWENTY_CORRECTED_SPACING;
    }

    (transverse, source)
}

/// Renders the label strings for a set of spacings with the rule's bar.
pub fn render_label(rule: &SlabTypeRule, values: &SpacingValues) -> DerivedLabel {
    let bar = |spacing| render_bar_label(rule.bar_count, &rule.caliber, spacing);
    DerivedLabel {
        longitudinal_text: bar(values.longitudinal),
        transverse1_text: bar(values.transverse1),
        transverse2_text: values.transverse2.map(bar),
    }
}
