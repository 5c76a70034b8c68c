//! Session report types.
//!
//! A [`SessionReport`] records what happened to every slab of a drawing:
//! which zones and texts were used, which values came from the baseline, and
//! every non-fatal problem met along the way. It serializes to JSON for
//! tooling and implements `Display` for the terminal.

use serde::Serialize;
use std::fmt;

use crate::derive::{DerivationEvent, DerivedLabel, SpacingValues};
use crate::ir::SourceId;

/// Report for one annotation session.
#[derive(Clone, Debug, Default, Serialize)]
pub struct SessionReport {
    /// Drawing name, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drawing: Option<String>,
    pub counts: SessionCounts,
    /// One entry per slab, in processing order.
    pub slabs: Vec<SlabOutcome>,
    pub issues: Vec<SessionIssue>,
}

impl SessionReport {
    pub fn new(drawing: Option<String>) -> Self {
        Self {
            drawing,
            ..Default::default()
        }
    }

    pub fn add(&mut self, issue: SessionIssue) {
        self.issues.push(issue);
    }

    pub fn warning_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == SessionSeverity::Warning)
            .count()
    }

    pub fn info_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == SessionSeverity::Info)
            .count()
    }

    /// Returns true if every slab got its label from its own texts.
    pub fn is_clean(&self) -> bool {
        self.warning_count() == 0
    }

    /// Issues with the given code.
    pub fn issues_with(&self, code: SessionIssueCode) -> impl Iterator<Item = &SessionIssue> {
        self.issues.iter().filter(move |i| i.code == code)
    }
}

impl fmt::Display for SessionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(name) = &self.drawing {
            writeln!(f, "Drawing '{}':", name)?;
        }
        let c = &self.counts;
        writeln!(
            f,
            "  {} slab(s), {} labeled, {} with fallback, {} sink failure(s), {} skipped zone(s)",
            c.slabs, c.labeled, c.fallback, c.sink_failures, c.skipped_zones
        )?;

        for slab in &self.slabs {
            match &slab.label {
                Some(label) => writeln!(f, "  {} ({}): {}", slab.slab, slab.slab_type, label)?,
                None => writeln!(f, "  {} ({}): no label", slab.slab, slab.slab_type)?,
            }
        }

        for (severity, title) in [
            (SessionSeverity::Warning, "Warnings"),
            (SessionSeverity::Info, "Notes"),
        ] {
            let count = self.issues.iter().filter(|i| i.severity == severity).count();
            if count == 0 {
                continue;
            }
            writeln!(f)?;
            writeln!(f, "{} ({}):", title, count)?;
            for issue in self.issues.iter().filter(|i| i.severity == severity) {
                writeln!(f, "  - {}", issue)?;
            }
        }

        Ok(())
    }
}

/// Session totals.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SessionCounts {
    pub slabs: usize,
    /// Labels the sink accepted.
    pub labeled: usize,
    /// Slabs where at least one value came from the baseline.
    pub fallback: usize,
    pub sink_failures: usize,
    /// Zone evaluations skipped because of invalid geometry.
    pub skipped_zones: usize,
    /// Texts read from zones, across all slabs.
    pub texts: usize,
    /// Texts no notation grammar matched.
    pub unparsed_texts: usize,
}

/// What happened to one slab.
#[derive(Clone, Debug, Serialize)]
pub struct SlabOutcome {
    pub slab: SourceId,
    /// Type of the rule that was applied.
    pub slab_type: String,
    pub horizontal_zones: Vec<SourceId>,
    pub vertical_zones: Vec<SourceId>,
    pub horizontal_texts: Vec<String>,
    pub vertical_texts: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub values: Option<SpacingValues>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<DerivedLabel>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<DerivationEvent>,
}

impl SlabOutcome {
    pub fn new(slab: SourceId, slab_type: impl Into<String>) -> Self {
        Self {
            slab,
            slab_type: slab_type.into(),
            horizontal_zones: Vec::new(),
            vertical_zones: Vec::new(),
            horizontal_texts: Vec::new(),
            vertical_texts: Vec::new(),
            values: None,
            label: None,
            events: Vec::new(),
        }
    }
}

/// A single non-fatal problem or policy note.
#[derive(Clone, Debug, Serialize)]
pub struct SessionIssue {
    pub severity: SessionSeverity,
    pub code: SessionIssueCode,
    pub message: String,
    /// Entity the issue is about, e.g. `slab 1F` or `zone 2A`.
    pub context: String,
}

impl SessionIssue {
    pub fn warning(
        code: SessionIssueCode,
        message: impl Into<String>,
        context: impl Into<String>,
    ) -> Self {
        Self {
            severity: SessionSeverity::Warning,
            code,
            message: message.into(),
            context: context.into(),
        }
    }

    pub fn info(
        code: SessionIssueCode,
        message: impl Into<String>,
        context: impl Into<String>,
    ) -> Self {
        Self {
            severity: SessionSeverity::Info,
            code,
            message: message.into(),
            context: context.into(),
        }
    }
}

impl fmt::Display for SessionIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.context, self.message)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionSeverity {
    /// A value was not derived from the slab's own data, or a label was lost.
    Warning,
    /// A policy rule fired.
    Info,
}

/// Stable issue codes for programmatic consumption.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionIssueCode {
    /// Slab type has no rule; the default type's rule was applied.
    UnknownSlabType,
    /// No rule at all could be found for the slab.
    MissingRule,
    /// A zone was skipped because its geometry could not be evaluated.
    InvalidZoneGeometry,
    /// The aggregate calculator failed; its outputs were treated as absent.
    AggregateFailed,
    /// No texts in any zone; the baseline was reused.
    EmptySlab,
    /// A value was read from text because the aggregate was missing.
    ValueFromText,
    /// A value came from the baseline.
    BaselineFallback,
    /// The `@20` correction changed a transverse spacing.
    TwentyCorrection,
    /// The slab's anchor point could not be computed.
    AnchorFailed,
    /// The label sink rejected a label.
    SinkFailed,
}
