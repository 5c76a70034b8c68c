//! Prelosa: reinforcement labels for structural slab drawings.
//!
//! Prelosa reads a slab drawing (slab outlines, reinforcement zones, and the
//! free-form texts written inside them), works out the bar spacing each slab
//! needs, and produces one formatted label per slab, anchored at the slab's
//! centre and aligned with its shortest edge.
//!
//! # Modules
//!
//! - [`ir`]: Drawing model and interchange formats
//! - [`geometry`]: Containment, areas, anchor point, orientation
//! - [`classify`]: Which zones belong to which slab
//! - [`text`]: Text normalization, localization, and notation parsing
//! - [`derive`]: Slab type rules, aggregate spacing, label derivation
//! - [`session`]: The per-drawing driver and its report
//! - [`sink`]: Where labels go
//! - [`config`]: Session configuration
//! - [`validation`]: Drawing validation and error reporting
//! - [`error`]: Error types for prelosa operations

pub mod classify;
pub mod config;
pub mod derive;
pub mod error;
pub mod geometry;
pub mod ir;
pub mod session;
pub mod sink;
pub mod text;
pub mod validation;

use std::path::{Path, PathBuf};

use clap::{ArgAction, Parser, Subcommand};
use serde::Serialize;
use tracing::{debug, info};

pub use error::PrelosaError;

/// The prelosa CLI application.
#[derive(Parser)]
#[command(name = "prelosa")]
#[command(version, author, about)]
#[command(propagate_version = true)]
struct Cli {
    /// Log more (-v for debug, -vv for trace). RUST_LOG takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Derive reinforcement labels for every slab of a drawing.
    Annotate(AnnotateArgs),
    /// Validate a drawing for errors and warnings.
    Validate(ValidateArgs),
    /// Normalize and parse reinforcement notations.
    Parse(ParseArgs),
}

/// Arguments for the annotate subcommand.
#[derive(clap::Args)]
struct AnnotateArgs {
    /// Drawing interchange file (JSON).
    input: PathBuf,

    /// Configuration file (YAML).
    #[arg(long, env = "PRELOSA_CONFIG")]
    config: Option<PathBuf>,

    /// Override the zone overlap threshold (0.2 default, 0.3 strict profile).
    #[arg(long)]
    threshold: Option<f64>,

    /// Write labels to this file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Label output format ('json' or 'csv').
    #[arg(long, default_value = "json")]
    format: String,

    /// Session report format ('text' or 'json').
    #[arg(long, default_value = "text")]
    report: String,

    /// Refuse drawings with slab types that have no configured rule.
    #[arg(long)]
    strict: bool,
}

/// Arguments for the validate subcommand.
#[derive(clap::Args)]
struct ValidateArgs {
    /// Drawing interchange file (JSON).
    input: PathBuf,

    /// Configuration file (YAML), for the known slab types and threshold.
    #[arg(long, env = "PRELOSA_CONFIG")]
    config: Option<PathBuf>,

    /// Treat warnings as errors (exit non-zero if any warnings).
    #[arg(long)]
    strict: bool,

    /// Output format for the report ('text' or 'json').
    #[arg(long, default_value = "text")]
    output: String,
}

/// Arguments for the parse subcommand.
#[derive(clap::Args)]
struct ParseArgs {
    /// Raw notation texts, e.g. '1%%C3/8"@20'.
    #[arg(required = true)]
    texts: Vec<String>,
}

/// Installs the stderr log subscriber.
///
/// `verbosity` 0 logs warnings, 1 debug, 2 or more trace. A `RUST_LOG`
/// variable overrides it. Calling this twice is harmless.
pub fn init_logging(verbosity: u8) {
    use tracing_subscriber::EnvFilter;

    let default_level = match verbosity {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("prelosa={}", default_level)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Run the prelosa CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), PrelosaError> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Some(Commands::Annotate(args)) => run_annotate(args),
        Some(Commands::Validate(args)) => run_validate(args),
        Some(Commands::Parse(args)) => run_parse(args),
        None => {
            println!("prelosa {}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("Reinforcement labels for structural slab drawings.");
            println!();
            println!("Run 'prelosa --help' for usage information.");
            Ok(())
        }
    }
}

fn load_session_config(path: Option<&Path>) -> Result<config::SessionConfig, PrelosaError> {
    match path {
        Some(path) => {
            let config = config::load_config(path)?;
            info!(path = %path.display(), "configuration loaded");
            Ok(config)
        }
        None => Ok(config::SessionConfig::default()),
    }
}

/// Execute the annotate subcommand.
fn run_annotate(args: AnnotateArgs) -> Result<(), PrelosaError> {
    if !matches!(args.format.as_str(), "json" | "csv") {
        return Err(PrelosaError::UnsupportedFormat(format!(
            "label format '{}' (supported: json, csv)",
            args.format
        )));
    }
    if !matches!(args.report.as_str(), "text" | "json") {
        return Err(PrelosaError::UnsupportedFormat(format!(
            "report format '{}' (supported: text, json)",
            args.report
        )));
    }

    let mut config = load_session_config(args.config.as_deref())?;
    if let Some(threshold) = args.threshold {
        config.overlap_threshold = threshold;
        config
            .check()
            .map_err(|message| PrelosaError::ConfigInvalid {
                path: PathBuf::from("--threshold"),
                message,
            })?;
    }

    let drawing = ir::io_json::read_drawing_json(&args.input)?;
    debug!(
        regions = drawing.regions.len(),
        texts = drawing.texts.len(),
        "drawing loaded"
    );

    if args.strict {
        if let Some(slab) = drawing
            .slabs()
            .find(|s| s.slab_type().is_some_and(|t| !config.knows(t)))
        {
            return Err(PrelosaError::UnknownSlabType {
                slab: slab.id.to_string(),
                slab_type: slab.slab_type().unwrap_or_default().to_string(),
            });
        }
    }

    let (placements, report) = session::run_session(&drawing, &config);

    let report_text = match args.report.as_str() {
        "json" => serde_json::to_string_pretty(&report).map_err(|source| {
            PrelosaError::JsonWrite {
                path: PathBuf::from("<report>"),
                source,
            }
        })?,
        _ => report.to_string(),
    };

    match &args.output {
        Some(path) => {
            match args.format.as_str() {
                "csv" => ir::io_labels_csv::write_labels_csv(path, &placements)?,
                _ => ir::io_json::write_labels_json(path, &placements)?,
            }
            println!(
                "Wrote {} label(s) to {}",
                placements.len(),
                path.display()
            );
            println!("{}", report_text.trim_end());
        }
        None => {
            let labels = match args.format.as_str() {
                "csv" => ir::io_labels_csv::to_labels_csv_string(&placements)?,
                _ => ir::io_json::labels_to_json_string(&placements).map_err(|source| {
                    PrelosaError::JsonWrite {
                        path: PathBuf::from("<stdout>"),
                        source,
                    }
                })?,
            };
            println!("{}", labels.trim_end());
            eprintln!("{}", report_text.trim_end());
        }
    }

    Ok(())
}

/// Execute the validate subcommand.
fn run_validate(args: ValidateArgs) -> Result<(), PrelosaError> {
    let config = load_session_config(args.config.as_deref())?;
    let drawing = ir::io_json::read_drawing_json(&args.input)?;

    let opts = validation::ValidateOptions {
        strict: args.strict,
    };
    let report = validation::validate_drawing(&drawing, &config);

    match args.output.as_str() {
        "json" => {
            let json = serde_json::to_string_pretty(&report.as_json()).map_err(|source| {
                PrelosaError::JsonWrite {
                    path: PathBuf::from("<stdout>"),
                    source,
                }
            })?;
            println!("{}", json);
        }
        "text" => print!("{}", report),
        other => {
            return Err(PrelosaError::UnsupportedFormat(format!(
                "report format '{}' (supported: text, json)",
                other
            )));
        }
    }

    if opts.rejects(&report) {
        Err(PrelosaError::ValidationFailed {
            error_count: report.error_count(),
            warning_count: report.warning_count(),
            report,
        })
    } else {
        Ok(())
    }
}

#[derive(Serialize)]
struct ParsedText<'a> {
    input: &'a str,
    normalized: String,
    notation: text::ParsedNotation,
}

/// Execute the parse subcommand.
fn run_parse(args: ParseArgs) -> Result<(), PrelosaError> {
    let parsed: Vec<ParsedText<'_>> = args
        .texts
        .iter()
        .map(|input| {
            let normalized = text::normalize_text(input);
            let notation = text::parse_notation(&normalized);
            ParsedText {
                input,
                normalized,
                notation,
            }
        })
        .collect();

    let json = serde_json::to_string_pretty(&parsed).map_err(|source| PrelosaError::JsonWrite {
        path: PathBuf::from("<stdout>"),
        source,
    })?;
    println!("{}", json);
    Ok(())
}
