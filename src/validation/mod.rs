//! Drawing validation for prelosa.
//!
//! This module checks a drawing before annotation for:
//! - Identity (unique region and text identifiers)
//! - Geometry (enough vertices, finite coordinates, non-zero area)
//! - Configuration fit (every slab type has a rule)
//! - Coverage (zones inside some slab, texts inside some zone)
//!
//! Validation never changes what a session does; the session copes with all
//! of these on its own. It tells the user which labels to distrust.

mod report;

pub use report::{IssueCode, IssueContext, Severity, ValidationIssue, ValidationReport};

use std::collections::HashMap;

use crate::classify::{overlap_ratio, ClassifyOptions};
use crate::config::SessionConfig;
use crate::geometry::{area, contains};
use crate::ir::{Drawing, Polygon, Region, SourceId};

/// Options for validation behavior.
#[derive(Clone, Debug, Default)]
pub struct ValidateOptions {
    /// If true, treat warnings as errors.
    pub strict: bool,
}

impl ValidateOptions {
    /// Returns true if `report` should fail validation under these options.
    pub fn rejects(&self, report: &ValidationReport) -> bool {
        report.error_count() > 0 || (self.strict && report.warning_count() > 0)
    }
}

/// Validates a drawing against a configuration and returns every issue found.
pub fn validate_drawing(drawing: &Drawing, config: &SessionConfig) -> ValidationReport {
    let mut report = ValidationReport::new();

    validate_regions(drawing, config, &mut report);
    validate_zone_coverage(drawing, config, &mut report);
    validate_texts(drawing, &mut report);

    report
}

/// Returns true if `polygon` is usable, reporting why not otherwise.
fn check_polygon(polygon: &Polygon, id: &SourceId, report: &mut ValidationReport) -> bool {
    let context = || IssueContext::Region { id: id.clone() };

    if polygon.len() < 3 {
        report.add(ValidationIssue::error(
            IssueCode::TooFewVertices,
            format!("Polygon has {} vertex(es), needs at least 3", polygon.len()),
            context(),
        ));
        return false;
    }

    if !polygon.is_finite() {
        report.add(ValidationIssue::error(
            IssueCode::NonFiniteCoordinate,
            "Polygon has a non-finite coordinate",
            context(),
        ));
        return false;
    }

    let a = area(polygon);
    if a <= 0.0 {
        report.add(ValidationIssue::error(
            IssueCode::ZeroArea,
            format!("Polygon encloses no area ({} collinear vertices)", polygon.len()),
            context(),
        ));
        return false;
    }

    true
}

fn validate_regions(drawing: &Drawing, config: &SessionConfig, report: &mut ValidationReport) {
    let mut seen_ids: HashMap<&SourceId, usize> = HashMap::new();

    for (idx, region) in drawing.regions.iter().enumerate() {
        // Check for duplicate IDs
        if let Some(first_idx) = seen_ids.get(&region.id) {
            report.add(ValidationIssue::error(
                IssueCode::DuplicateRegionId,
                format!(
                    "Duplicate region ID {} (first seen at index {})",
                    region.id, first_idx
                ),
                IssueContext::Region {
                    id: region.id.clone(),
                },
            ));
        } else {
            seen_ids.insert(&region.id, idx);
        }

        check_polygon(&region.polygon, &region.id, report);

        if let Some(slab_type) = region.slab_type() {
            if slab_type.trim().is_empty() {
                report.add(ValidationIssue::error(
                    IssueCode::EmptySlabType,
                    "Slab has an empty type name",
                    IssueContext::Region {
                        id: region.id.clone(),
                    },
                ));
            } else if !config.knows(slab_type) {
                report.add(ValidationIssue::warning(
                    IssueCode::UnknownSlabType,
                    format!(
                        "Unknown slab type '{}' (the '{}' rule will be used)",
                        slab_type, config.default_slab_type
                    ),
                    IssueContext::Region {
                        id: region.id.clone(),
                    },
                ));
            }
        }
    }
}

/// Warns about zones no slab will claim.
fn validate_zone_coverage(
    drawing: &Drawing,
    config: &SessionConfig,
    report: &mut ValidationReport,
) {
    let opts = ClassifyOptions {
        overlap_threshold: config.overlap_threshold,
    };
    let usable = |r: &&Region| r.polygon.len() >= 3 && r.polygon.is_finite();
    let slabs: Vec<&Region> = drawing.slabs().filter(usable).collect();

    for zone in drawing.zones().filter(usable) {
        if area(&zone.polygon) <= 0.0 {
            continue;
        }
        let claimed = slabs.iter().any(|slab| {
            overlap_ratio(&slab.polygon, &zone.polygon)
                .map(|ratio| ratio >= opts.overlap_threshold)
                .unwrap_or(false)
        });
        if !claimed {
            report.add(ValidationIssue::warning(
                IssueCode::OrphanZone,
                format!(
                    "Zone is not inside any slab (overlap below {})",
                    opts.overlap_threshold
                ),
                IssueContext::Region {
                    id: zone.id.clone(),
                },
            ));
        }
    }
}

fn validate_texts(drawing: &Drawing, report: &mut ValidationReport) {
    let mut seen_ids: HashMap<&SourceId, usize> = HashMap::new();
    let zones: Vec<&Region> = drawing.zones().collect();

    for (index, text) in drawing.texts.iter().enumerate() {
        let context = || IssueContext::Text {
            index,
            id: text.id.clone(),
        };

        if let Some(id) = &text.id {
            if let Some(first_idx) = seen_ids.get(id) {
                report.add(ValidationIssue::warning(
                    IssueCode::DuplicateTextId,
                    format!("Duplicate text ID {} (first seen at index {})", id, first_idx),
                    context(),
                ));
            } else {
                seen_ids.insert(id, index);
            }
        }

        if !text.insertion.is_finite() {
            report.add(ValidationIssue::error(
                IssueCode::NonFiniteCoordinate,
                format!(
                    "Non-finite insertion point ({}, {})",
                    text.insertion.x, text.insertion.y
                ),
                context(),
            ));
            continue;
        }

        if text.normalized().is_empty() {
            report.add(ValidationIssue::warning(
                IssueCode::EmptyText,
                "Text is empty after normalization",
                context(),
            ));
            continue;
        }

        if !zones.iter().any(|z| contains(&z.polygon, &text.insertion)) {
            report.add(ValidationIssue::warning(
                IssueCode::TextOutsideZones,
                format!("Text '{}' is not inside any zone", text.normalized()),
                context(),
            ));
        }
    }
}
