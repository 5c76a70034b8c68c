//! Session configuration.
//!
//! Built-in defaults cover the four standard slab types. A YAML file can
//! override any top-level value and add or replace slab types by name:
//!
//! ```yaml
//! overlap_threshold: 0.3
//! baseline: { longitudinal: ".20", transverse1: ".25" }
//! slab_types:
//!   ribbed:
//!     kind: fixed-transverse
//!     transverse1: ".25"
//!     caliber: '1/2"'
//!     defaults: { longitudinal: 0.25, transverse1: 0.25 }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::classify::DEFAULT_OVERLAP_THRESHOLD;
use crate::derive::{builtin_rules, Baseline, SlabTypeRule, DEFAULT_SPACING_STEP, SOLID};
use crate::error::PrelosaError;

/// Everything a session needs besides the drawing.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SessionConfig {
    /// Minimum fraction of a zone's area inside a slab for the zone to count.
    pub overlap_threshold: f64,
    /// Values used before any slab has produced its own.
    pub baseline: Baseline,
    /// Rule used for slabs whose type has no entry in `slab_types`.
    pub default_slab_type: String,
    pub slab_types: BTreeMap<String, SlabTypeRule>,
    /// Rounding step of the steel-area calculator; `None` disables rounding.
    pub aggregate_step: Option<f64>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            overlap_threshold: DEFAULT_OVERLAP_THRESHOLD,
            baseline: Baseline::default(),
            default_slab_type: SOLID.to_string(),
            slab_types: builtin_rules(),
            aggregate_step: Some(DEFAULT_SPACING_STEP),
        }
    }
}

impl SessionConfig {
    /// Looks up the rule for `slab_type`, falling back to the default type.
    ///
    /// Returns `None` when neither is configured.
    pub fn rule_for(&self, slab_type: &str) -> Option<&SlabTypeRule> {
        self.slab_types.get(slab_type).or_else(|| self.default_rule())
    }

    /// Returns true if `slab_type` has its own rule.
    pub fn knows(&self, slab_type: &str) -> bool {
        self.slab_types.contains_key(slab_type)
    }

    /// The rule for unknown slab types.
    pub fn default_rule(&self) -> Option<&SlabTypeRule> {
        self.slab_types.get(&self.default_slab_type)
    }

    /// Checks cross-field constraints.
    pub fn check(&self) -> Result<(), String> {
        if !(self.overlap_threshold > 0.0 && self.overlap_threshold <= 1.0) {
            return Err(format!(
                "overlap_threshold must be in (0, 1], got {}",
                self.overlap_threshold
            ));
        }
        if !self.knows(&self.default_slab_type) {
            return Err(format!(
                "default_slab_type '{}' has no slab_types entry",
                self.default_slab_type
            ));
        }
        if let Some(step) = self.aggregate_step {
            if !(step > 0.0 && step.is_finite()) {
                return Err(format!("aggregate_step must be positive, got {}", step));
            }
        }
        for (name, rule) in &self.slab_types {
            if rule.caliber.trim().is_empty() {
                return Err(format!("slab type '{}' has an empty caliber", name));
            }
            if rule.bar_count == 0 {
                return Err(format!("slab type '{}' has a bar_count of 0", name));
            }
        }
        Ok(())
    }
}

/// On-disk shape: every field optional, merged over the defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    overlap_threshold: Option<f64>,
    baseline: Option<Baseline>,
    default_slab_type: Option<String>,
    #[serde(default)]
    slab_types: BTreeMap<String, SlabTypeRule>,
    #[serde(default)]
    aggregate_step: Option<StepSetting>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StepSetting {
    Step(f64),
    Off(String),
}

impl ConfigFile {
    fn merge_into(self, mut config: SessionConfig) -> Result<SessionConfig, String> {
        if let Some(threshold) = self.overlap_threshold {
            config.overlap_threshold = threshold;
        }
        if let Some(baseline) = self.baseline {
            config.baseline = baseline;
        }
        if let Some(default_type) = self.default_slab_type {
            config.default_slab_type = default_type;
        }
        match self.aggregate_step {
            Some(StepSetting::Step(step)) => config.aggregate_step = Some(step),
            Some(StepSetting::Off(word)) if word == "off" || word == "none" => {
                config.aggregate_step = None
            }
            Some(StepSetting::Off(word)) => {
                return Err(format!(
                    "aggregate_step must be a number or 'off', got '{}'",
                    word
                ))
            }
            None => {}
        }
        for (name, mut rule) in self.slab_types {
            if rule.name.is_empty() {
                rule.name = name.clone();
            } else if rule.name != name {
                return Err(format!(
                    "slab type key '{}' does not match its name '{}'",
                    name, rule.name
                ));
            }
            debug!(slab_type = %name, "configured slab type");
            config.slab_types.insert(name, rule);
        }
        Ok(config)
    }
}

/// Parses a configuration from YAML text. `path` is only used in errors.
pub fn from_yaml_str(yaml: &str, path: &Path) -> Result<SessionConfig, PrelosaError> {
    let file: ConfigFile = if yaml.trim().is_empty() {
        ConfigFile::default()
    } else {
        serde_yaml::from_str(yaml).map_err(|source| PrelosaError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?
    };

    let invalid = |message| PrelosaError::ConfigInvalid {
        path: path.to_path_buf(),
        message,
    };
    let config = file.merge_into(SessionConfig::default()).map_err(invalid)?;
    config.check().map_err(invalid)?;
    Ok(config)
}

/// Loads a configuration file, merging it over the built-in defaults.
pub fn load_config(path: &Path) -> Result<SessionConfig, PrelosaError> {
    let yaml = fs::read_to_string(path)?;
    from_yaml_str(&yaml, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::derive::{RuleKind, LIGHTENED_TWO_DIRECTION};

    fn parse(yaml: &str) -> Result<SessionConfig, PrelosaError> {
        from_yaml_str(yaml, Path::new("test.yaml"))
    }

    #[test]
    fn empty_file_is_the_default() {
        assert_eq!(parse("").unwrap(), SessionConfig::default());
    }

    #[test]
    fn defaults_are_valid() {
        let config = SessionConfig::default();
        assert!(config.check().is_ok());
        assert_eq!(config.overlap_threshold, 0.2);
        assert_eq!(config.default_rule().unwrap().name, SOLID);
    }

    #[test]
    fn overrides_and_custom_types_merge() {
        let config = parse(
            r#"
overlap_threshold: 0.3
baseline: { longitudinal: ".175", transverse1: 0.25 }
aggregate_step: off
slab_types:
  ribbed:
    kind: fixed-transverse
    transverse1: ".30"
    defaults: { longitudinal: 0.25, transverse1: 0.30 }
"#,
        )
        .unwrap();
        assert_eq!(config.overlap_threshold, 0.3);
        assert_eq!(config.baseline.longitudinal, 0.175);
        assert_eq!(config.aggregate_step, None);
        assert_eq!(config.slab_types["ribbed"].name, "ribbed");
        assert_eq!(
            config.slab_types["ribbed"].kind,
            RuleKind::FixedTransverse {
                transverse1: 0.30,
                transverse2: None
            }
        );
        // Built-ins survive.
        assert!(config.knows(LIGHTENED_TWO_DIRECTION));
    }

    #[test]
    fn rejects_unknown_default_type() {
        let err = parse("default_slab_type: waffle\n").unwrap_err();
        assert!(matches!(err, PrelosaError::ConfigInvalid { .. }));
        assert!(err.to_string().contains("waffle"));
    }

    #[test]
    fn rejects_out_of_range_threshold() {
        assert!(matches!(
            parse("overlap_threshold: 1.5\n"),
            Err(PrelosaError::ConfigInvalid { .. })
        ));
    }

    #[test]
    fn rejects_unknown_keys() {
        assert!(matches!(
            parse("treshold: 0.3\n"),
            Err(PrelosaError::ConfigParse { .. })
        ));
    }

    #[test]
    fn load_config_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prelosa.yaml");
        fs::write(&path, "overlap_threshold: 0.25\n").unwrap();
        assert_eq!(load_config(&path).unwrap().overlap_threshold, 0.25);
    }
}
