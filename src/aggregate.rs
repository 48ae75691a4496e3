//! Folding dependency results into check reports
//!
//! Every non-satisfied result contributes exactly one structured error, in
//! declaration order.

use crate::domain::{
    Ambiguity, CheckReport, DependencyResult, Outcome, ResultSummary, StructuredError,
};
use crate::namespace::NamespaceScope;
use std::collections::BTreeSet;

/// Build the report for a fully resolved declaration
pub fn aggregate(results: Vec<DependencyResult>, scope: &NamespaceScope) -> CheckReport {
    let mut summary = ResultSummary::default();
    let mut errors = Vec::new();

    for result in &results {
        summary.record(result.outcome());
        if let Some(error) = structured_error(result, scope) {
            errors.push(error);
        }
    }

    CheckReport::from_parts(results, errors, summary, scope.namespaces.clone())
}

impl CheckReport {
    /// Report for an empty declaration
    pub fn empty() -> Self {
        CheckReport::from_parts(
            Vec::new(),
            Vec::new(),
            ResultSummary::default(),
            BTreeSet::new(),
        )
    }

    /// Report for a check stopped before resolution
    pub fn aborted(error: StructuredError) -> Self {
        CheckReport::from_parts(
            Vec::new(),
            vec![error],
            ResultSummary::default(),
            BTreeSet::new(),
        )
    }
}

/// Map a result to its error category, `None` when satisfied
fn structured_error(result: &DependencyResult, scope: &NamespaceScope) -> Option<StructuredError> {
    let subject = result.name().to_string();
    let required_version = result.required_version().to_string();

    let error = match result.outcome() {
        Outcome::Satisfied => return None,
        Outcome::NotFound => StructuredError::DependencyNotFound {
            subject,
            required_version,
            search_pattern: scope.pattern.clone(),
        },
        Outcome::VersionMismatch => {
            let release = result.found_releases().first();
            StructuredError::VersionMismatch {
                subject,
                required_version,
                found_version: release.map(|r| r.chart.version.clone()).unwrap_or_default(),
                namespace: release.map(|r| r.namespace.clone()).unwrap_or_default(),
                release: release.map(|r| r.name.clone()).unwrap_or_default(),
            }
        }
        Outcome::MultipleFound => match result.ambiguity() {
            Some(Ambiguity::SameNamespace { namespace }) => StructuredError::DuplicateInNamespace {
                subject,
                required_version,
                namespace: namespace.clone(),
                found_releases: result
                    .found_releases()
                    .iter()
                    .map(|r| r.name.clone())
                    .collect(),
            },
            Some(Ambiguity::AcrossNamespaces { namespaces }) => {
                StructuredError::MultipleDeployments {
                    subject,
                    required_version,
                    found_namespaces: namespaces.clone(),
                }
            }
            None => StructuredError::MultipleDeployments {
                subject,
                required_version,
                found_namespaces: result
                    .found_releases()
                    .iter()
                    .map(|r| r.namespace.clone())
                    .collect::<BTreeSet<_>>()
                    .into_iter()
                    .collect(),
            },
        },
        Outcome::Error => StructuredError::DirectoryError {
            subject,
            required_version: Some(required_version),
            message: result.error().unwrap_or_default().to_string(),
        },
    };
    Some(error)
}
