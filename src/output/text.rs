//! Text output formatter for human-readable display
//!
//! This module provides:
//! - Run totals with per-outcome counts
//! - Per-chart dependency listings (failures always, everything when verbose)
//! - The structured error list
//! - A final pass/fail line

use crate::domain::{ChartReport, DependencyResult, Outcome, ResultSummary, RunReport};
use crate::output::{OutputFormatter, Verbosity};
use colored::Colorize;
use std::io::Write;

/// Text formatter for human-readable output
pub struct TextFormatter {
    /// Verbosity level
    verbosity: Verbosity,
    /// Whether to use colors
    color: bool,
}

impl TextFormatter {
    /// Create a new text formatter
    pub fn new(verbosity: Verbosity) -> Self {
        Self {
            verbosity,
            color: true,
        }
    }

    /// Create a new text formatter with color option
    pub fn with_color(verbosity: Verbosity, color: bool) -> Self {
        Self { verbosity, color }
    }

    fn status_symbol(&self, outcome: Outcome) -> String {
        let (symbol, satisfied) = match outcome {
            Outcome::Satisfied => ("✓", true),
            Outcome::NotFound => ("✗", false),
            Outcome::VersionMismatch => ("≠", false),
            Outcome::MultipleFound => ("⚠", false),
            Outcome::Error => ("!", false),
        };
        match (self.color, satisfied) {
            (false, _) => symbol.to_string(),
            (true, true) => symbol.green().to_string(),
            (true, false) => symbol.red().to_string(),
        }
    }

    fn ok_mark(&self) -> String {
        if self.color {
            "✓".green().to_string()
        } else {
            "✓".to_string()
        }
    }

    fn fail_mark(&self) -> String {
        if self.color {
            "✗".red().to_string()
        } else {
            "✗".to_string()
        }
    }

    fn heading(&self, text: &str) -> String {
        if self.color {
            text.bold().to_string()
        } else {
            text.to_string()
        }
    }

    fn format_dependency(
        &self,
        dependency: &DependencyResult,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        writeln!(
            writer,
            "    {} {} (required: {})",
            self.status_symbol(dependency.outcome()),
            dependency.name(),
            dependency.required_version()
        )?;

        if self.verbosity == Verbosity::Verbose || !dependency.is_satisfied() {
            for release in dependency.found_releases() {
                writeln!(
                    writer,
                    "        Found: {}/{} (version: {})",
                    release.namespace, release.name, release.chart.version
                )?;
            }
            if let Some(error) = dependency.error() {
                let error = if self.color {
                    error.yellow().to_string()
                } else {
                    error.to_string()
                };
                writeln!(writer, "        Error: {}", error)?;
            }
        }
        Ok(())
    }
}

impl OutputFormatter for TextFormatter {
    fn format(&self, report: &RunReport, writer: &mut dyn Write) -> std::io::Result<()> {
        // In quiet mode, only show failing charts and the verdict
        if self.verbosity == Verbosity::Quiet {
            for chart in report.chart_results.iter().filter(|c| !c.success()) {
                self.format_chart(chart, writer)?;
            }
            if report.success {
                writeln!(writer, "{} All chart dependencies satisfied", self.ok_mark())?;
            } else {
                writeln!(writer, "{} Dependency check failed", self.fail_mark())?;
            }
            return Ok(());
        }

        writeln!(writer, "{}", self.heading("Dependency Check Results"))?;
        writeln!(writer, "========================")?;
        writeln!(writer)?;
        writeln!(writer, "Charts Checked: {}", report.chart_results.len())?;

        if self.verbosity == Verbosity::Verbose {
            if report.matched_namespaces.is_empty() {
                writeln!(writer, "No namespaces matched the pattern")?;
            } else {
                let namespaces: Vec<&str> =
                    report.matched_namespaces.iter().map(String::as_str).collect();
                writeln!(
                    writer,
                    "Matched Namespaces ({}): {}",
                    namespaces.len(),
                    namespaces.join(", ")
                )?;
            }
        }

        if report.total_summary.total == 0 {
            writeln!(writer, "No dependencies found in any charts")?;
        } else {
            self.format_summary(&report.total_summary, writer)?;
        }
        writeln!(writer)?;

        for chart in &report.chart_results {
            self.format_chart(chart, writer)?;
        }

        if !report.errors.is_empty() {
            writeln!(writer, "{}", self.heading("Errors:"))?;
            writeln!(writer, "-------")?;
            for error in &report.errors {
                if self.color {
                    writeln!(writer, "{}", error.to_string().red())?;
                } else {
                    writeln!(writer, "{}", error)?;
                }
            }
            writeln!(writer)?;
        }

        if report.success {
            writeln!(writer, "{} All chart dependencies satisfied!", self.ok_mark())?;
        } else {
            writeln!(writer, "{} Dependency check failed!", self.fail_mark())?;
        }
        Ok(())
    }

    fn format_summary(
        &self,
        summary: &ResultSummary,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        writeln!(writer, "Total Dependencies: {}", summary.total)?;
        writeln!(writer, "{} Satisfied: {}", self.ok_mark(), summary.satisfied)?;

        let failures = [
            ("Not Found", summary.not_found),
            ("Version Mismatch", summary.mismatched),
            ("Multiple Found", summary.multiple),
            ("Errors", summary.errors),
        ];
        for (label, count) in failures.iter().filter(|(_, count)| *count > 0) {
            writeln!(writer, "{} {}: {}", self.fail_mark(), label, count)?;
        }
        Ok(())
    }

    fn format_chart(&self, chart: &ChartReport, writer: &mut dyn Write) -> std::io::Result<()> {
        let path = chart.chart_path.display().to_string();
        let name = if chart.chart_name.is_empty() {
            "<unknown>"
        } else {
            chart.chart_name.as_str()
        };
        let title = format!("Chart: {} ({})", name, path);
        writeln!(writer, "{}", self.heading(&title))?;
        writeln!(writer, "{}", "-".repeat(title.chars().count()))?;

        let report = &chart.report;
        let summary = report.summary();
        if summary.total == 0 {
            if report.errors().is_empty() {
                writeln!(writer, "  No dependencies found")?;
            } else {
                for error in report.errors() {
                    writeln!(writer, "  {} {}", self.fail_mark(), error)?;
                }
            }
            writeln!(writer)?;
            return Ok(());
        }

        if chart.success() {
            writeln!(
                writer,
                "  Dependencies: {} ({} All satisfied)",
                summary.total,
                self.ok_mark()
            )?;
        } else {
            writeln!(
                writer,
                "  Dependencies: {} ({} {} issues)",
                summary.total,
                self.fail_mark(),
                summary.failed()
            )?;
        }

        if self.verbosity == Verbosity::Verbose || !chart.success() {
            for dependency in report.dependencies() {
                self.format_dependency(dependency, writer)?;
            }
        }
        writeln!(writer)?;
        Ok(())
    }
}
