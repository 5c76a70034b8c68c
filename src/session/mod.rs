//! Per-drawing annotation driver.
//!
//! A [`Session`] walks a drawing's slabs in source order. For each slab it:
//!
//! 1. selects the zones the slab contains ([`classify_contained`]);
//! 2. collects the texts inside each zone, bucketed by zone orientation;
//! 3. parses the notations and asks the aggregate calculator for spacings;
//! 4. derives the label against the current baseline;
//! 5. hands the label, anchored at the slab's centre and rotated to its
//!    shortest edge, to the sink;
//! 6. makes the derived values the baseline for the next slab.
//!
//! Nothing inside the loop is fatal. Problems are logged, counted, and
//! recorded in the [`SessionReport`].

mod report;

pub use report::{
    SessionCounts, SessionIssue, SessionIssueCode, SessionReport, SessionSeverity, SlabOutcome,
};

use tracing::{debug, info, info_span, warn};

use crate::classify::{classify_contained, ClassifyOptions};
use crate::config::SessionConfig;
use crate::derive::{
    derive, AggregateCalculator, AggregateInputs, AggregateOutputs, Baseline, BarSpec,
    DerivationEvent, DerivationInput, SteelAreaCalculator,
};
use crate::geometry::{centroid, shortest_edge_orientation};
use crate::ir::{Drawing, Region, ZoneOrientation};
use crate::sink::{CollectingSink, LabelPlacement, LabelSink};
use crate::text::{localize_refs, parse_notations, ParsedNotation};

/// Runs slabs through the pipeline, owning the baseline between them.
pub struct Session<'c, C, S> {
    config: &'c SessionConfig,
    calculator: C,
    sink: S,
    baseline: Baseline,
}

impl<'c, C: AggregateCalculator, S: LabelSink> Session<'c, C, S> {
    /// Starts a session at the configured baseline.
    pub fn new(config: &'c SessionConfig, calculator: C, sink: S) -> Self {
        Self {
            config,
            calculator,
            sink,
            baseline: config.baseline.clone(),
        }
    }

    /// The values the next slab falls back to.
    pub fn baseline(&self) -> &Baseline {
        &self.baseline
    }

    pub fn into_parts(self) -> (C, S) {
        (self.calculator, self.sink)
    }

    /// Processes every slab of `drawing`, in order.
    pub fn run(&mut self, drawing: &Drawing) -> SessionReport {
        let mut report = SessionReport::new(drawing.info.name.clone());
        for slab in drawing.slabs() {
            self.process_slab(drawing, slab, &mut report);
        }
        info!(
            slabs = report.counts.slabs,
            labeled = report.counts.labeled,
            fallback = report.counts.fallback,
            "session finished"
        );
        report
    }

    /// Processes one slab and records its outcome in `report`.
    pub fn process_slab(&mut self, drawing: &Drawing, slab: &Region, report: &mut SessionReport) {
        let _span = info_span!("slab", id = %slab.id).entered();
        let config = self.config;
        let context = format!("slab {}", slab.id);
        report.counts.slabs += 1;

        let declared_type = slab.slab_type().unwrap_or(config.default_slab_type.as_str());
        let Some(rule) = config.rule_for(declared_type) else {
            warn!(slab_type = declared_type, "no rule for slab type");
            report.add(SessionIssue::warning(
                SessionIssueCode::MissingRule,
                format!("no rule for slab type '{}'", declared_type),
                context,
            ));
            report.slabs.push(SlabOutcome::new(slab.id.clone(), declared_type));
            return;
        };
        if !config.knows(declared_type) {
            warn!(slab_type = declared_type, fallback = %rule.name, "unknown slab type");
            report.add(SessionIssue::warning(
                SessionIssueCode::UnknownSlabType,
                format!(
                    "unknown slab type '{}', using '{}'",
                    declared_type, rule.name
                ),
                context.clone(),
            ));
        }
        let mut outcome = SlabOutcome::new(slab.id.clone(), rule.name.clone());

        // Zones and their texts.
        let opts = ClassifyOptions {
            overlap_threshold: config.overlap_threshold,
        };
        let classification = classify_contained(&slab.polygon, drawing.zones(), &opts);
        for skipped in &classification.skipped {
            report.counts.skipped_zones += 1;
            report.add(SessionIssue::warning(
                SessionIssueCode::InvalidZoneGeometry,
                format!("zone {} skipped: {}", skipped.region.id, skipped.error),
                context.clone(),
            ));
        }

        for zone in &classification.included {
            let texts = localize_refs(&zone.polygon, &drawing.texts);
            let (zones, bucket) = match zone.orientation() {
                Some(ZoneOrientation::Vertical) => {
                    (&mut outcome.vertical_zones, &mut outcome.vertical_texts)
                }
                _ => (&mut outcome.horizontal_zones, &mut outcome.horizontal_texts),
            };
            zones.push(zone.id.clone());
            bucket.extend(texts.into_iter().map(str::to_string));
        }

        let horizontal = parse_notations(&outcome.horizontal_texts);
        let vertical = parse_notations(&outcome.vertical_texts);
        let unparsed = horizontal
            .iter()
            .chain(&vertical)
            .filter(|n| n.is_empty())
            .count();
        report.counts.texts += horizontal.len() + vertical.len();
        report.counts.unparsed_texts += unparsed;
        debug!(
            horizontal = horizontal.len(),
            vertical = vertical.len(),
            unparsed,
            "texts parsed"
        );

        // Aggregate spacings.
        let bars = |notations: &[ParsedNotation]| -> Vec<BarSpec> {
            notations
                .iter()
                .filter_map(|n| BarSpec::from_notation(n, rule.spacing_conversion))
                .collect()
        };
        let inputs = AggregateInputs {
            slab_type: rule.name.clone(),
            caliber: rule.caliber.clone(),
            horizontal: bars(&horizontal),
            vertical: bars(&vertical),
        };
        let aggregate = match self.calculator.compute(&inputs) {
            Ok(outputs) => outputs,
            Err(error) => {
                warn!(%error, "aggregate calculation failed");
                report.add(SessionIssue::warning(
                    SessionIssueCode::AggregateFailed,
                    error.to_string(),
                    context.clone(),
                ));
                AggregateOutputs::default()
            }
        };

        // Derivation.
        let derivation = derive(&DerivationInput {
            rule,
            horizontal: &horizontal,
            vertical: &vertical,
            aggregate: &aggregate,
            baseline: &self.baseline,
        });
        if derivation.used_fallback() {
            report.counts.fallback += 1;
        }
        for event in &derivation.events {
            report.add(event_issue(event, &context));
        }

        outcome.values = Some(derivation.values.clone());
        outcome.label = Some(derivation.label.clone());
        outcome.events = derivation.events.clone();
        self.baseline = derivation.values;

        // Placement.
        match centroid(&slab.polygon) {
            Ok(insertion) => {
                let placement = LabelPlacement {
                    slab: slab.id.clone(),
                    slab_type: rule.name.clone(),
                    insertion,
                    angle_degrees: shortest_edge_orientation(&slab.polygon),
                    label: derivation.label,
                };
                match self.sink.insert(placement) {
                    Ok(()) => {
                        report.counts.labeled += 1;
                        debug!(label = ?outcome.label, "label placed");
                    }
                    Err(error) => {
                        warn!(%error, "label sink failed");
                        report.counts.sink_failures += 1;
                        report.add(SessionIssue::warning(
                            SessionIssueCode::SinkFailed,
                            error.to_string(),
                            context.clone(),
                        ));
                    }
                }
            }
            Err(error) => {
                warn!(%error, "cannot anchor label");
                report.add(SessionIssue::warning(
                    SessionIssueCode::AnchorFailed,
                    format!("no anchor point: {}", error),
                    context.clone(),
                ));
            }
        }

        report.slabs.push(outcome);
    }
}

fn event_issue(event: &DerivationEvent, context: &str) -> SessionIssue {
    match event {
        DerivationEvent::EmptySlab => SessionIssue::info(
            SessionIssueCode::EmptySlab,
            "no texts in any zone; previous values reused",
            context,
        ),
        DerivationEvent::LongitudinalFromText { spacing } => SessionIssue::info(
            SessionIssueCode::ValueFromText,
            format!("longitudinal {:.3} read from first horizontal text", spacing),
            context,
        ),
        DerivationEvent::TransverseFromText { spacing } => SessionIssue::info(
            SessionIssueCode::ValueFromText,
            format!("transverse {:.3} read from first vertical text", spacing),
            context,
        ),
        DerivationEvent::TwentyCorrection { from } => SessionIssue::info(
            SessionIssueCode::TwentyCorrection,
            format!("transverse {:.3} forced to 0.100 by an @20 text", from),
            context,
        ),
        DerivationEvent::LongitudinalBaselineFallback { spacing } => SessionIssue::warning(
            SessionIssueCode::BaselineFallback,
            format!("longitudinal not derivable; previous {:.3} used", spacing),
            context,
        ),
        DerivationEvent::TransverseBaselineFallback { spacing } => SessionIssue::warning(
            SessionIssueCode::BaselineFallback,
            format!("transverse not derivable; previous {:.3} used", spacing),
            context,
        ),
    }
}

/// Annotates a drawing with the steel-area calculator, collecting labels in
/// memory.
pub fn run_session(
    drawing: &Drawing,
    config: &SessionConfig,
) -> (Vec<LabelPlacement>, SessionReport) {
    let calculator = SteelAreaCalculator {
        spacing_step: config.aggregate_step,
    };
    let mut session = Session::new(config, calculator, CollectingSink::new());
    let report = session.run(drawing);
    let (_, sink) = session.into_parts();
    (sink.into_placements(), report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::derive::{AggregateError, SOLID};
    use crate::ir::{AnchoredText, Point, Polygon};
    use crate::sink::SinkError;

    fn drawing() -> Drawing {
        Drawing {
            regions: vec![
                Region::slab("1F", SOLID, Polygon::rectangle(0.0, 0.0, 10.0, 4.0)),
                Region::zone(
                    "2A",
                    ZoneOrientation::Horizontal,
                    Polygon::rectangle(1.0, 1.0, 9.0, 2.0),
                ),
                Region::slab("3B", SOLID, Polygon::rectangle(20.0, 0.0, 24.0, 4.0)),
            ],
            texts: vec![AnchoredText::new(Point::new(2.0, 1.5), "1%%C3/8\"@20")],
            ..Default::default()
        }
    }

    #[test]
    fn labels_slabs_and_threads_baseline() {
        let config = SessionConfig::default();
        let (placements, report) = run_session(&drawing(), &config);

        assert_eq!(placements.len(), 2);
        assert_eq!(placements[0].label.longitudinal_text, "1Ø3/8\"@.20");
        assert_eq!(placements[0].insertion, Point::new(5.0, 2.0));
        assert_eq!(placements[0].angle_degrees, 90.0);
        // Second slab has no zones: it repeats the first slab's values.
        assert_eq!(placements[1].label, placements[0].label);

        assert_eq!(report.counts.slabs, 2);
        assert_eq!(report.counts.labeled, 2);
        assert_eq!(report.counts.fallback, 1);
        assert_eq!(report.slabs[0].horizontal_zones[0].as_str(), "2A");
        assert_eq!(report.slabs[0].horizontal_texts, vec!["1∅3/8\"@20"]);
        assert_eq!(report.issues_with(SessionIssueCode::EmptySlab).count(), 1);
    }

    #[test]
    fn unknown_slab_type_uses_default_rule() {
        let mut drawing = drawing();
        drawing.regions[0] =
            Region::slab("1F", "waffle", Polygon::rectangle(0.0, 0.0, 10.0, 4.0));
        let (placements, report) = run_session(&drawing, &SessionConfig::default());
        assert_eq!(placements[0].slab_type, SOLID);
        assert_eq!(
            report.issues_with(SessionIssueCode::UnknownSlabType).count(),
            1
        );
    }

    struct FailingCalculator;

    impl AggregateCalculator for FailingCalculator {
        fn compute(&mut self, _: &AggregateInputs) -> Result<AggregateOutputs, AggregateError> {
            Err(AggregateError::Engine("workbook closed".into()))
        }
    }

    #[test]
    fn aggregate_failure_falls_back_to_text() {
        let config = SessionConfig::default();
        let mut sink = CollectingSink::new();
        let mut session = Session::new(&config, FailingCalculator, &mut sink);
        let report = session.run(&drawing());

        assert_eq!(report.issues_with(SessionIssueCode::AggregateFailed).count(), 2);
        assert_eq!(report.issues_with(SessionIssueCode::ValueFromText).count(), 1);
        assert_eq!(sink.placements[0].label.longitudinal_text, "1Ø3/8\"@.20");
    }

    struct RejectingSink {
        calls: usize,
    }

    impl LabelSink for RejectingSink {
        fn insert(&mut self, placement: LabelPlacement) -> Result<(), SinkError> {
            self.calls += 1;
            Err(SinkError::Rejected {
                slab: placement.slab,
                message: "layer locked".into(),
            })
        }
    }

    #[test]
    fn sink_failures_are_counted_not_fatal() {
        let config = SessionConfig::default();
        let mut session = Session::new(
            &config,
            SteelAreaCalculator::default(),
            RejectingSink { calls: 0 },
        );
        let report = session.run(&drawing());
        let (_, sink) = session.into_parts();

        assert_eq!(sink.calls, 2);
        assert_eq!(report.counts.sink_failures, 2);
        assert_eq!(report.counts.labeled, 0);
        // Derivation still happened, so the baseline moved on.
        assert_eq!(report.slabs[1].values, report.slabs[0].values);
    }

    #[test]
    fn degenerate_slab_gets_no_anchor() {
        let mut drawing = drawing();
        drawing.regions[2] = Region::slab("3B", SOLID, Polygon::from_coords(&[(0.0, 0.0)]));
        let (placements, report) = run_session(&drawing, &SessionConfig::default());
        assert_eq!(placements.len(), 1);
        assert_eq!(report.issues_with(SessionIssueCode::AnchorFailed).count(), 1);
    }

    #[test]
    fn broken_zone_is_reported_per_slab() {
        let mut drawing = drawing();
        drawing.regions.push(Region::zone(
            "bad",
            ZoneOrientation::Vertical,
            Polygon::from_coords(&[(1.0, 1.0), (2.0, 2.0)]),
        ));
        let (_, report) = run_session(&drawing, &SessionConfig::default());
        assert_eq!(report.counts.skipped_zones, 2);
        assert_eq!(
            report
                .issues_with(SessionIssueCode::InvalidZoneGeometry)
                .count(),
            2
        );
    }
}
