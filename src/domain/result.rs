//! Per-dependency check outcomes

use super::{Dependency, Release};
use serde::Serialize;
use std::fmt;

/// Classification of a single dependency check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Satisfied,
    NotFound,
    VersionMismatch,
    MultipleFound,
    Error,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Satisfied => "satisfied",
            Outcome::NotFound => "not_found",
            Outcome::VersionMismatch => "version_mismatch",
            Outcome::MultipleFound => "multiple_found",
            Outcome::Error => "error",
        }
    }

    pub fn is_satisfied(&self) -> bool {
        matches!(self, Outcome::Satisfied)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a dependency matched more than one release
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Ambiguity {
    /// Several releases of the chart live in one namespace
    SameNamespace { namespace: String },
    /// Releases of the chart live in several namespaces
    AcrossNamespaces { namespaces: Vec<String> },
}

/// Result of checking one declared dependency
///
/// Only the constructors below create values, which keeps `ambiguity` present
/// exactly when the outcome is [`Outcome::MultipleFound`] and `error` present
/// for every outcome except [`Outcome::Satisfied`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencyResult {
    name: String,
    required_version: String,
    #[serde(rename = "status")]
    outcome: Outcome,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    found_releases: Vec<Release>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip)]
    ambiguity: Option<Ambiguity>,
}

impl DependencyResult {
    fn build(
        dependency: &Dependency,
        outcome: Outcome,
        found_releases: Vec<Release>,
        error: Option<String>,
        ambiguity: Option<Ambiguity>,
    ) -> Self {
        Self {
            name: dependency.name.clone(),
            required_version: dependency.required_version().to_string(),
            outcome,
            found_releases,
            error,
            ambiguity,
        }
    }

    pub fn satisfied(dependency: &Dependency, release: Release) -> Self {
        Self::build(dependency, Outcome::Satisfied, vec![release], None, None)
    }

    pub fn version_mismatch(dependency: &Dependency, release: Release) -> Self {
        let message = format!(
            "version {} does not satisfy constraint {}",
            release.chart.version,
            dependency.required_version()
        );
        Self::build(
            dependency,
            Outcome::VersionMismatch,
            vec![release],
            Some(message),
            None,
        )
    }

    pub fn not_found(dependency: &Dependency) -> Self {
        Self::build(
            dependency,
            Outcome::NotFound,
            Vec::new(),
            Some("no matching releases found".to_string()),
            None,
        )
    }

    /// Several releases of the dependency in a single namespace
    pub fn duplicate_in_namespace(
        dependency: &Dependency,
        namespace: impl Into<String>,
        releases: Vec<Release>,
    ) -> Self {
        let namespace = namespace.into();
        let message = format!("multiple instances found in namespace {namespace}");
        Self::build(
            dependency,
            Outcome::MultipleFound,
            releases,
            Some(message),
            Some(Ambiguity::SameNamespace { namespace }),
        )
    }

    /// Releases of the dependency in several namespaces
    pub fn across_namespaces(
        dependency: &Dependency,
        namespaces: Vec<String>,
        releases: Vec<Release>,
    ) -> Self {
        let message = format!("found in multiple namespaces: {}", namespaces.join(", "));
        Self::build(
            dependency,
            Outcome::MultipleFound,
            releases,
            Some(message),
            Some(Ambiguity::AcrossNamespaces { namespaces }),
        )
    }

    /// Lookup or evaluation failure
    pub fn failed(dependency: &Dependency, message: impl Into<String>) -> Self {
        Self::failed_with_releases(dependency, message, Vec::new())
    }

    pub fn failed_with_releases(
        dependency: &Dependency,
        message: impl Into<String>,
        releases: Vec<Release>,
    ) -> Self {
        Self::build(
            dependency,
            Outcome::Error,
            releases,
            Some(message.into()),
            None,
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn required_version(&self) -> &str {
        &self.required_version
    }

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    pub fn found_releases(&self) -> &[Release] {
        &self.found_releases
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn ambiguity(&self) -> Option<&Ambiguity> {
        self.ambiguity.as_ref()
    }

    pub fn is_satisfied(&self) -> bool {
        self.outcome.is_satisfied()
    }
}
