//! # ctxb-validate entry point
//!
//! Parses command-line arguments, initializes logging, and runs a single
//! packet validation.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use ctxb_cli::validate::{run_validate, ValidateArgs};

/// Validate a context packet against its schema and time semantics.
///
/// Prints a JSON (or text) verdict on stdout. Exit status: 0 valid,
/// 1 invalid, 2 usage or environment error.
#[derive(Parser, Debug)]
#[command(name = "ctxb-validate", version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging on stderr. Repeat for more (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Path to a YAML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(flatten)]
    args: ValidateArgs,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // `--help` and `--version` are not usage errors.
            let code = if e.use_stderr() { 2 } else { 0 };
            let _ = e.print();
            return ExitCode::from(code);
        }
    };

    let filter = match cli.verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("ctxb-validate v{} starting", env!("CARGO_PKG_VERSION"));

    match run_validate(&cli.args, cli.config.as_deref()) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("{e:#}");
            ExitCode::from(2)
        }
    }
}
