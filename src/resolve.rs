//! Dependency resolution against a release directory
//!
//! Classification order for one dependency:
//! 1. No releases: not found
//! 2. Several releases in one namespace: duplicate (first namespace by name)
//! 3. Releases in several namespaces: ambiguous
//! 4. One release: evaluate the constraint

use crate::directory::ReleaseDirectory;
use crate::domain::{Dependency, DependencyResult, Release};
use crate::namespace::NamespaceScope;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Resolves declared dependencies through a release directory
pub struct Resolver<'a> {
    directory: &'a dyn ReleaseDirectory,
}

impl<'a> Resolver<'a> {
    pub fn new(directory: &'a dyn ReleaseDirectory) -> Self {
        Self { directory }
    }

    /// Look up and classify one dependency
    ///
    /// Lookup failures become an error outcome for this dependency only.
    pub async fn resolve(
        &self,
        dependency: &Dependency,
        scope: &NamespaceScope,
    ) -> DependencyResult {
        match self.directory.find_releases(&dependency.name, scope).await {
            Ok(releases) => {
                debug!(
                    dependency = %dependency.name,
                    directory = self.directory.name(),
                    found = releases.len(),
                    "looked up releases"
                );
                classify(dependency, releases)
            }
            Err(e) => {
                warn!(dependency = %dependency.name, error = %e, "release lookup failed");
                DependencyResult::failed(dependency, format!("failed to find releases: {e}"))
            }
        }
    }
}

/// Classify the releases found for a dependency
///
/// Pure: the result depends only on the dependency and the set of releases,
/// not on the order the directory returned them in.
pub fn classify(dependency: &Dependency, mut releases: Vec<Release>) -> DependencyResult {
    releases.sort_by(|a, b| {
        a.namespace
            .cmp(&b.namespace)
            .then_with(|| a.name.cmp(&b.name))
            .then_with(|| a.chart.version.cmp(&b.chart.version))
    });

    if releases.is_empty() {
        return DependencyResult::not_found(dependency);
    }

    let mut by_namespace: BTreeMap<&str, usize> = BTreeMap::new();
    for release in &releases {
        *by_namespace.entry(release.namespace.as_str()).or_default() += 1;
    }

    let duplicated = by_namespace
        .iter()
        .find(|(_, count)| **count > 1)
        .map(|(namespace, _)| namespace.to_string());
    if let Some(namespace) = duplicated {
        let duplicates = releases
            .into_iter()
            .filter(|r| r.namespace == namespace)
            .collect();
        return DependencyResult::duplicate_in_namespace(dependency, namespace, duplicates);
    }

    if by_namespace.len() > 1 {
        let namespaces = by_namespace.keys().map(|ns| ns.to_string()).collect();
        return DependencyResult::across_namespaces(dependency, namespaces, releases);
    }

    let Some(release) = releases.pop() else {
        return DependencyResult::not_found(dependency);
    };
    match dependency.constraint.is_satisfied_by(&release.chart.version) {
        Ok(true) => DependencyResult::satisfied(dependency, release),
        Ok(false) => DependencyResult::version_mismatch(dependency, release),
        Err(e) => DependencyResult::failed_with_releases(
            dependency,
            format!("version compatibility check failed: {e}"),
            vec![release],
        ),
    }
}
