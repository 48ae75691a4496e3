//! JSON output formatter for machine processing

use crate::domain::{ChartReport, ResultSummary, RunReport};
use crate::output::OutputFormatter;
use std::io::Write;

/// JSON formatter for machine-readable output
#[derive(Debug, Default)]
pub struct JsonFormatter;

impl JsonFormatter {
    /// Create a new JSON formatter
    pub fn new() -> Self {
        Self
    }
}

impl OutputFormatter for JsonFormatter {
    fn format(&self, report: &RunReport, writer: &mut dyn Write) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(report).map_err(std::io::Error::other)?;
        writeln!(writer, "{}", json)
    }

    fn format_summary(
        &self,
        summary: &ResultSummary,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(summary).map_err(std::io::Error::other)?;
        writeln!(writer, "{}", json)
    }

    fn format_chart(&self, chart: &ChartReport, writer: &mut dyn Write) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(chart).map_err(std::io::Error::other)?;
        writeln!(writer, "{}", json)
    }
}
