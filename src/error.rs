use std::path::PathBuf;
use thiserror::Error;

use crate::validation::ValidationReport;

/// The main error type for prelosa operations.
///
/// These are boundary errors: loading a drawing or configuration, writing
/// labels, or a failed validation run. Failures inside the per-slab pipeline
/// are never raised through this type; they are recorded in the
/// [`SessionReport`](crate::session::SessionReport) instead.
#[derive(Debug, Error)]
pub enum PrelosaError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse drawing JSON from {path}: {source}")]
    DrawingJsonParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write JSON to {path}: {source}")]
    JsonWrite {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to parse configuration from {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid configuration in {path}: {message}")]
    ConfigInvalid { path: PathBuf, message: String },

    #[error("Failed to write label CSV to {path}: {source}")]
    LabelsCsvWrite {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Invalid label CSV output for {path}: {message}")]
    LabelsCsvInvalid { path: PathBuf, message: String },

    #[error("Slab {slab} has type '{slab_type}', which has no configured rule")]
    UnknownSlabType { slab: String, slab_type: String },

    #[error("Validation failed with {error_count} error(s) and {warning_count} warning(s)")]
    ValidationFailed {
        error_count: usize,
        warning_count: usize,
        report: ValidationReport,
    },

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}
