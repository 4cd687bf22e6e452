mod cli;
mod json;

pub use cli::{describe_signal_source, print_cli_table};
pub use json::print_json;

use crate::model::TrustReport;
use anyhow::Result;

/// Output format for trust reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable table format
    Table,
    /// JSON format for programmatic use
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {}. Use 'table' or 'json'", s)),
        }
    }
}

/// Renders the report to stdout.
///
/// `full` requests the complete breakdown (scorecard checks, release
/// statistics, update history) instead of the aggregate view.
pub fn print_report(report: &TrustReport, format: OutputFormat, full: bool) -> Result<()> {
    match format {
        OutputFormat::Table => print_cli_table(report, full),
        OutputFormat::Json => print_json(report),
    }
}

/// Format the report to a string for file output.
pub fn format_report_to_string(report: &TrustReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
        OutputFormat::Table => {
            // For table format, just use JSON as the file output
            Ok(serde_json::to_string_pretty(report)?)
        }
    }
}
