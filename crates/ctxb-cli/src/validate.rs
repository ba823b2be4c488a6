//! # Validate Command
//!
//! Reads the schema and packet from disk and prints one verdict.
//!
//! Environment failures (schema unreadable or invalid, packet unreadable)
//! are reported in the normal verdict shape and exit with status 2.
//! Usage failures (missing packet path, malformed duration flag, bad
//! config file) are returned as `Err` for the caller to print on stderr.

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use chrono::Utc;
use clap::Args;
use ctxb_core::{Issue, IssueCode, ValidationReport, Verdict};
use ctxb_packet::{PacketValidator, TemporalPolicy};
use ctxb_schema::{load_schema_document, JsonSchemaEngine, SchemaEngine, SchemaError};
use tracing::{debug, info};

use crate::config::{FileConfig, FlagOverrides, Settings};
use crate::output::{render, OutputFormat};

/// Arguments for packet validation.
#[derive(Args, Debug, Clone, Default)]
pub struct ValidateArgs {
    /// Path to a context packet JSON file.
    #[arg(value_name = "PACKET")]
    pub packet: Option<PathBuf>,

    /// Path to a context packet JSON file (alternative to the positional argument).
    #[arg(long = "packet", value_name = "PATH", conflicts_with = "packet")]
    pub packet_flag: Option<PathBuf>,

    /// Path to the JSON Schema file [default: schemas/context_packet.schema.v1.0.0.json].
    #[arg(long, value_name = "PATH")]
    pub schema: Option<PathBuf>,

    /// Allowed clock skew tolerance, e.g. 60s or 5m [default: 60s].
    #[arg(long, value_name = "DURATION")]
    pub clock_skew: Option<String>,

    /// Allowed future offset for created_at [default: 5m].
    #[arg(long, value_name = "DURATION")]
    pub allow_future_created_at: Option<String>,

    /// Temporal policy: tolerant (current) or exact (legacy, zero tolerance) [default: tolerant].
    #[arg(long, value_name = "POLICY")]
    pub time_policy: Option<TemporalPolicy>,

    /// Output format [default: json].
    #[arg(long, value_enum)]
    pub output: Option<OutputFormat>,
}

impl ValidateArgs {
    /// The packet path from either the positional argument or `--packet`.
    pub fn packet_path(&self) -> Option<&Path> {
        self.packet.as_deref().or(self.packet_flag.as_deref())
    }

    fn overrides(&self) -> FlagOverrides {
        FlagOverrides {
            schema: self.schema.clone(),
            clock_skew: self.clock_skew.clone(),
            allow_future_created_at: self.allow_future_created_at.clone(),
            time_policy: self.time_policy,
            output: self.output,
        }
    }
}

/// Run one validation and print the verdict.
///
/// Returns the process exit status on success.
///
/// # Errors
///
/// Usage errors: no packet path, unreadable or malformed config file,
/// invalid duration flag.
pub fn run_validate(args: &ValidateArgs, config_path: Option<&Path>) -> Result<u8> {
    let Some(packet_path) = args.packet_path() else {
        bail!("missing --packet");
    };

    let file = match config_path {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::default(),
    };
    let settings = Settings::resolve(args.overrides(), file)?;
    debug!(
        schema = %settings.schema.display(),
        clock_skew = %settings.validator.clock_skew_tolerance,
        allow_future_created_at = %settings.validator.allow_future_created_at,
        policy = %settings.validator.policy,
        "resolved settings"
    );

    let report = validate_file(packet_path, &settings);
    let (out, exit) = render(&report, settings.output);
    println!("{out}");
    Ok(exit)
}

/// Load the schema, read the packet, validate against one clock read.
pub fn validate_file(packet_path: &Path, settings: &Settings) -> ValidationReport {
    let validator = match compile_schema(&settings.schema, settings) {
        Ok(v) => v,
        Err(e) => return environment_failure(e.issue_code(), e.to_string()),
    };

    let bytes = match std::fs::read(packet_path) {
        Ok(bytes) => bytes,
        Err(e) => {
            return environment_failure(
                IssueCode::PacketReadError,
                format!("cannot read packet file {}: {e}", packet_path.display()),
            )
        }
    };

    let now = Utc::now();
    info!(packet = %packet_path.display(), %now, "validating packet");
    validator.validate(&bytes, now)
}

fn compile_schema(
    schema_path: &Path,
    settings: &Settings,
) -> Result<PacketValidator<ctxb_schema::JsonSchemaValidator>, SchemaError> {
    let document = load_schema_document(schema_path)?;
    let schema_dir = schema_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let engine = JsonSchemaEngine::new()
        .with_schema_name(schema_path.display().to_string())
        .with_schema_dir(schema_dir)?;
    debug!(resources = engine.resource_count(), "schema engine ready");

    let compiled = engine.compile(&document)?;
    Ok(PacketValidator::new(compiled, settings.validator))
}

fn environment_failure(code: IssueCode, message: String) -> ValidationReport {
    tracing::warn!(%code, "{message}");
    ValidationReport::new(Verdict::Invalid(Issue::new(code, message)))
}
