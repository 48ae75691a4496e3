//! Check reports and summary statistics

use super::{DependencyResult, Outcome, StructuredError};
use serde::Serialize;
use std::collections::BTreeSet;
use std::ops::AddAssign;
use std::path::PathBuf;

/// Counts of dependency outcomes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ResultSummary {
    pub total: usize,
    pub satisfied: usize,
    pub not_found: usize,
    pub mismatched: usize,
    pub multiple: usize,
    pub errors: usize,
}

impl ResultSummary {
    /// Count one outcome
    pub fn record(&mut self, outcome: Outcome) {
        self.total += 1;
        match outcome {
            Outcome::Satisfied => self.satisfied += 1,
            Outcome::NotFound => self.not_found += 1,
            Outcome::VersionMismatch => self.mismatched += 1,
            Outcome::MultipleFound => self.multiple += 1,
            Outcome::Error => self.errors += 1,
        }
    }

    /// Number of dependencies that did not pass
    pub fn failed(&self) -> usize {
        self.total - self.satisfied
    }
}

impl AddAssign for ResultSummary {
    fn add_assign(&mut self, other: Self) {
        self.total += other.total;
        self.satisfied += other.satisfied;
        self.not_found += other.not_found;
        self.mismatched += other.mismatched;
        self.multiple += other.multiple;
        self.errors += other.errors;
    }
}

/// Outcome of checking one declaration
///
/// Produced only by [`crate::aggregate`], which keeps `success`, the summary
/// and the error list consistent with the dependency results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckReport {
    success: bool,
    dependencies: Vec<DependencyResult>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    errors: Vec<StructuredError>,
    summary: ResultSummary,
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    matched_namespaces: BTreeSet<String>,
}

impl CheckReport {
    pub(crate) fn from_parts(
        dependencies: Vec<DependencyResult>,
        errors: Vec<StructuredError>,
        summary: ResultSummary,
        matched_namespaces: BTreeSet<String>,
    ) -> Self {
        let success = errors.is_empty() && dependencies.iter().all(|d| d.is_satisfied());
        Self {
            success,
            dependencies,
            errors,
            summary,
            matched_namespaces,
        }
    }

    pub fn success(&self) -> bool {
        self.success
    }

    pub fn dependencies(&self) -> &[DependencyResult] {
        &self.dependencies
    }

    pub fn errors(&self) -> &[StructuredError] {
        &self.errors
    }

    pub fn summary(&self) -> &ResultSummary {
        &self.summary
    }

    pub fn matched_namespaces(&self) -> &BTreeSet<String> {
        &self.matched_namespaces
    }
}

/// Check report for one chart directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartReport {
    /// Chart directory as given on the command line
    pub chart_path: PathBuf,
    /// Name from Chart.yaml, empty when it could not be read
    pub chart_name: String,
    #[serde(flatten)]
    pub report: CheckReport,
}

impl ChartReport {
    pub fn new(
        chart_path: impl Into<PathBuf>,
        chart_name: impl Into<String>,
        report: CheckReport,
    ) -> Self {
        Self {
            chart_path: chart_path.into(),
            chart_name: chart_name.into(),
            report,
        }
    }

    pub fn success(&self) -> bool {
        self.report.success()
    }
}

/// Combined report for every chart checked in one run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub success: bool,
    pub chart_results: Vec<ChartReport>,
    pub total_summary: ResultSummary,
    /// Top-level errors of every chart, in chart order
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<StructuredError>,
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub matched_namespaces: BTreeSet<String>,
}

impl RunReport {
    pub fn new(chart_results: Vec<ChartReport>) -> Self {
        let mut total_summary = ResultSummary::default();
        let mut errors = Vec::new();
        let mut matched_namespaces = BTreeSet::new();
        for chart in &chart_results {
            total_summary += *chart.report.summary();
            errors.extend(chart.report.errors().iter().cloned());
            matched_namespaces.extend(chart.report.matched_namespaces().iter().cloned());
        }
        Self {
            success: chart_results.iter().all(ChartReport::success),
            chart_results,
            total_summary,
            errors,
            matched_namespaces,
        }
    }
}
