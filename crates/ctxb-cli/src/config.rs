//! # Settings Resolution
//!
//! Merges three layers, highest precedence first: command-line flags, the
//! YAML file named by `--config`, built-in defaults.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use ctxb_core::Duration;
use ctxb_packet::{TemporalPolicy, ValidatorConfig};
use serde::Deserialize;

use crate::output::OutputFormat;

/// Default schema location, relative to the working directory.
pub const DEFAULT_SCHEMA_PATH: &str = "schemas/context_packet.schema.v1.0.0.json";

/// Default `--clock-skew`.
pub const DEFAULT_CLOCK_SKEW: &str = "60s";

/// Default `--allow-future-created-at`.
pub const DEFAULT_ALLOW_FUTURE_CREATED_AT: &str = "5m";

/// Contents of a `--config` YAML file. Every key is optional.
///
/// ```yaml
/// schema: schemas/context_packet.schema.v1.0.0.json
/// clock_skew: 90s
/// allow_future_created_at: 2m
/// time_policy: tolerant
/// output: text
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    /// Schema document path.
    pub schema: Option<PathBuf>,
    /// Clock skew tolerance, `<int><unit>`.
    pub clock_skew: Option<String>,
    /// Future-creation allowance, `<int><unit>`.
    pub allow_future_created_at: Option<String>,
    /// Temporal policy.
    pub time_policy: Option<TemporalPolicy>,
    /// Output format.
    pub output: Option<OutputFormat>,
}

impl FileConfig {
    /// Read and parse a YAML config file.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or does not match [`FileConfig`].
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read config file {}", path.display()))?;
        Self::from_yaml(&content).with_context(|| format!("invalid config file {}", path.display()))
    }

    /// Parse YAML text. An empty document yields all-`None`.
    ///
    /// # Errors
    ///
    /// Fails on malformed YAML or unknown keys.
    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }
}

/// Command-line overrides. `None` means the flag was not given.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlagOverrides {
    /// `--schema`
    pub schema: Option<PathBuf>,
    /// `--clock-skew`
    pub clock_skew: Option<String>,
    /// `--allow-future-created-at`
    pub allow_future_created_at: Option<String>,
    /// `--time-policy`
    pub time_policy: Option<TemporalPolicy>,
    /// `--output`
    pub output: Option<OutputFormat>,
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Schema document path.
    pub schema: PathBuf,
    /// Validator tolerances and policy.
    pub validator: ValidatorConfig,
    /// Output format.
    pub output: OutputFormat,
}

impl Settings {
    /// Merge flags over file values over defaults, then parse the
    /// duration strings.
    ///
    /// # Errors
    ///
    /// Fails if either duration is rejected by the duration parser; the
    /// message names the offending flag.
    pub fn resolve(flags: FlagOverrides, file: FileConfig) -> Result<Self> {
        let schema = flags
            .schema
            .or(file.schema)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SCHEMA_PATH));

        let clock_skew = flags
            .clock_skew
            .or(file.clock_skew)
            .unwrap_or_else(|| DEFAULT_CLOCK_SKEW.to_string());
        let allow_future = flags
            .allow_future_created_at
            .or(file.allow_future_created_at)
            .unwrap_or_else(|| DEFAULT_ALLOW_FUTURE_CREATED_AT.to_string());

        let clock_skew = Duration::parse(&clock_skew, "clock-skew")?;
        let allow_future = Duration::parse(&allow_future, "allow-future-created-at")?;

        let policy = flags.time_policy.or(file.time_policy).unwrap_or_default();
        let output = flags.output.or(file.output).unwrap_or_default();

        Ok(Self {
            schema,
            validator: ValidatorConfig::default()
                .with_clock_skew_tolerance(clock_skew)
                .with_allow_future_created_at(allow_future)
                .with_policy(policy),
            output,
        })
    }
}
