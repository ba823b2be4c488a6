//! # Verdict Output
//!
//! Renders a [`ValidationReport`] for stdout.

use clap::ValueEnum;
use ctxb_core::{ValidationReport, Verdict};
use serde::Deserialize;

/// How the verdict is printed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Pretty-printed JSON verdict.
    #[default]
    Json,
    /// One summary line plus one line per issue.
    Text,
}

/// Render `report` in the requested format.
///
/// JSON rendering only fails if serialization itself fails. In that case
/// a hand-assembled line with the same `ok` value and issue code is
/// returned instead. The exit status always follows the verdict.
pub fn render(report: &ValidationReport, format: OutputFormat) -> (String, u8) {
    let exit = report.verdict.exit_code();
    match format {
        OutputFormat::Text => (report.to_text(), exit),
        OutputFormat::Json => match report.to_json_pretty() {
            Ok(json) => (json, exit),
            Err(e) => {
                tracing::error!("failed to serialize verdict: {e}");
                (fallback_json(&report.verdict, &e.to_string()), exit)
            }
        },
    }
}

/// Best-effort verdict line assembled without serde.
fn fallback_json(verdict: &Verdict, reason: &str) -> String {
    match verdict.code() {
        None => "{\"ok\":true}".to_string(),
        Some(code) => format!(
            "{{\"ok\":false,\"issues\":[{{\"code\":\"{}\",\"message\":\"failed to serialize verdict: {}\"}}]}}",
            code.as_str(),
            escape(reason)
        ),
    }
}

fn escape(s: &str) -> String {
    s.chars()
        .flat_map(|c| match c {
            '"' => vec!['\\', '"'],
            '\\' => vec!['\\', '\\'],
            '\n' => vec!['\\', 'n'],
            c if c.is_control() => vec![' '],
            c => vec![c],
        })
        .collect()
}
