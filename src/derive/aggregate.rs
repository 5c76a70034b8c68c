//! Aggregate spacing calculation.
//!
//! The aggregate calculator turns the bars read from a slab's zones into one
//! equivalent spacing per direction for the slab type's caliber. The engine
//! treats it as a pure function of its inputs: [`AggregateCalculator::compute`].
//!
//! Two implementations are provided:
//!
//! - [`SteelAreaCalculator`]: matches steel area per metre.
//! - [`CellBackedCalculator`]: drives an external cell-based engine (a
//!   spreadsheet workbook) through `set_input` / `recompute` / `get_output`,
//!   restoring the engine's inputs afterwards so no values leak between slabs.

use std::collections::BTreeMap;
use std::f64::consts::PI;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::text::{diameter_in_mm, ParsedNotation, SpacingConversion};

/// One `{count, diameter, spacing}` triple.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BarSpec {
    pub count: u32,
    pub diameter: String,
    /// Spacing in metres.
    pub spacing: f64,
}

impl BarSpec {
    /// Builds a triple from a parsed notation, re-reading the spacing digits
    /// with `conversion`. Needs a diameter and a positive spacing.
    pub fn from_notation(notation: &ParsedNotation, conversion: SpacingConversion) -> Option<Self> {
        let diameter = notation.diameter.clone()?;
        let spacing = notation
            .spacing_with(conversion)
            .filter(|s| *s > 0.0 && s.is_finite())?;
        Some(Self {
            count: notation.count.unwrap_or(1),
            diameter,
            spacing,
        })
    }
}

/// Everything a calculator sees for one slab.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AggregateInputs {
    pub slab_type: String,
    /// Caliber the outputs are expressed for.
    pub caliber: String,
    pub horizontal: Vec<BarSpec>,
    pub vertical: Vec<BarSpec>,
}

/// Calculator results. Absent or zero values are treated as "no result".
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct AggregateOutputs {
    pub longitudinal: Option<f64>,
    pub transverse: Option<f64>,
}

/// Value held by an engine cell.
#[derive(Clone, Debug, PartialEq)]
pub enum CellValue {
    Number(f64),
    Text(String),
    Empty,
}

#[derive(Clone, Debug, PartialEq, Error)]
pub enum AggregateError {
    #[error("aggregate engine failed: {0}")]
    Engine(String),

    #[error("unknown bar caliber '{0}'")]
    UnknownCaliber(String),
}

/// Computes aggregate spacings for one slab.
pub trait AggregateCalculator {
    fn compute(&mut self, inputs: &AggregateInputs) -> Result<AggregateOutputs, AggregateError>;
}

/// Default rounding step for equivalent spacings, in metres.
pub const DEFAULT_SPACING_STEP: f64 = 0.025;

/// Equivalent spacing by steel area per metre.
///
/// For a zone, `As = Σ count·π·d²/4 / s`; the equivalent spacing of the
/// caliber bar is `π·dc²/4 / As`, floored to `spacing_step` when set.
/// Triples with an unknown diameter are ignored; a zone without usable
/// triples has no output.
#[derive(Clone, Debug)]
pub struct SteelAreaCalculator {
    pub spacing_step: Option<f64>,
}

impl Default for SteelAreaCalculator {
    fn default() -> Self {
        Self {
            spacing_step: Some(DEFAULT_SPACING_STEP),
        }
    }
}

fn bar_area_mm2(diameter_mm: f64) -> f64 {
    PI * diameter_mm * diameter_mm / 4.0
}

impl SteelAreaCalculator {
    fn zone_spacing(&self, caliber_area: f64, bars: &[BarSpec]) -> Option<f64> {
        let steel_per_metre: f64 = bars
            .iter()
            .filter_map(|bar| {
                let d = diameter_in_mm(&bar.diameter)?;
                Some(bar.count as f64 * bar_area_mm2(d) / bar.spacing)
            })
            .sum();
        if steel_per_metre <= 0.0 || !steel_per_metre.is_finite() {
            return None;
        }

        let equivalent = caliber_area / steel_per_metre;
        let spacing = match self.spacing_step {
            Some(step) if step > 0.0 => ((equivalent / step) + 1e-9).floor() * step,
            _ => equivalent,
        };
        Some(spacing).filter(|s| *s > 0.0)
    }
}

impl AggregateCalculator for SteelAreaCalculator {
    fn compute(&mut self, inputs: &AggregateInputs) -> Result<AggregateOutputs, AggregateError> {
        let caliber_mm = diameter_in_mm(&inputs.caliber)
            .ok_or_else(|| AggregateError::UnknownCaliber(inputs.caliber.clone()))?;
        let caliber_area = bar_area_mm2(caliber_mm);

        Ok(AggregateOutputs {
            longitudinal: self.zone_spacing(caliber_area, &inputs.horizontal),
            transverse: self.zone_spacing(caliber_area, &inputs.vertical),
        })
    }
}

/// Input cells for one zone's triple.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ZoneCells {
    pub count: String,
    pub diameter: String,
    pub spacing: String,
}

/// Where a slab's inputs go and its outputs come from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CellLayout {
    pub horizontal: ZoneCells,
    pub vertical: ZoneCells,
    pub longitudinal_output: String,
    pub transverse_output: String,
}

impl Default for CellLayout {
    fn default() -> Self {
        Self {
            horizontal: ZoneCells {
                count: "B4".into(),
                diameter: "C4".into(),
                spacing: "D4".into(),
            },
            vertical: ZoneCells {
                count: "B5".into(),
                diameter: "C5".into(),
                spacing: "D5".into(),
            },
            longitudinal_output: "F4".into(),
            transverse_output: "F5".into(),
        }
    }
}

impl CellLayout {
    fn input_cells(&self) -> [&str; 6] {
        [
            &self.horizontal.count,
            &self.horizontal.diameter,
            &self.horizontal.spacing,
            &self.vertical.count,
            &self.vertical.diameter,
            &self.vertical.spacing,
        ]
    }
}

/// A stateful cell-based calculation engine.
///
/// Values persist across calls until overwritten. `recompute` must run before
/// outputs reflect new inputs.
pub trait CellEngine {
    fn get_input(&self, cell: &str) -> CellValue;
    fn set_input(&mut self, cell: &str, value: CellValue) -> Result<(), AggregateError>;
    fn recompute(&mut self) -> Result<(), AggregateError>;
    fn get_output(&self, cell: &str) -> Option<f64>;
}

/// Adapts a [`CellEngine`] to [`AggregateCalculator`].
///
/// Only the first triple of each zone fits the engine's single slot. Zones
/// without a triple leave their slot untouched.
pub struct CellBackedCalculator<E> {
    engine: E,
    default_layout: CellLayout,
    layouts: BTreeMap<String, CellLayout>,
}

impl<E: CellEngine> CellBackedCalculator<E> {
    pub fn new(engine: E, default_layout: CellLayout) -> Self {
        Self {
            engine,
            default_layout,
            layouts: BTreeMap::new(),
        }
    }

    /// Uses `layout` for slabs of `slab_type`.
    pub fn with_layout(mut self, slab_type: impl Into<String>, layout: CellLayout) -> Self {
        self.layouts.insert(slab_type.into(), layout);
        self
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn into_engine(self) -> E {
        self.engine
    }

    fn write_triple(&mut self, cells: &ZoneCells, bar: &BarSpec) -> Result<(), AggregateError> {
        self.engine
            .set_input(&cells.count, CellValue::Number(bar.count as f64))?;
        self.engine
            .set_input(&cells.diameter, CellValue::Text(bar.diameter.clone()))?;
        self.engine
            .set_input(&cells.spacing, CellValue::Number(bar.spacing))
    }

    fn run(
        &mut self,
        layout: &CellLayout,
        inputs: &AggregateInputs,
    ) -> Result<AggregateOutputs, AggregateError> {
        if let Some(bar) = inputs.horizontal.first() {
            self.write_triple(&layout.horizontal, bar)?;
        }
        if let Some(bar) = inputs.vertical.first() {
            self.write_triple(&layout.vertical, bar)?;
        }
        self.engine.recompute()?;

        Ok(AggregateOutputs {
            longitudinal: self.engine.get_output(&layout.longitudinal_output),
            transverse: self.engine.get_output(&layout.transverse_output),
        })
    }
}

impl<E: CellEngine> AggregateCalculator for CellBackedCalculator<E> {
    fn compute(&mut self, inputs: &AggregateInputs) -> Result<AggregateOutputs, AggregateError> {
        let layout = self
            .layouts
            .get(&inputs.slab_type)
            .unwrap_or(&self.default_layout)
            .clone();

        let snapshot: Vec<(String, CellValue)> = layout
            .input_cells()
            .iter()
            .map(|cell| (cell.to_string(), self.engine.get_input(cell)))
            .collect();

        let result = self.run(&layout, inputs);

        let restored = snapshot
            .into_iter()
            .try_for_each(|(cell, value)| self.engine.set_input(&cell, value))
            .and_then(|()| self.engine.recompute());
        if let Err(error) = restored {
            warn!(%error, slab_type = %inputs.slab_type, "failed to restore engine baseline");
        }

        debug!(slab_type = %inputs.slab_type, ?result, "cell engine aggregate");
        result
    }
}
